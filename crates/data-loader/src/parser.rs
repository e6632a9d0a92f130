//! Parser for MovieLens-style CSV files.
//!
//! - movies.csv: movieId,title,genres
//! - ratings.csv: userId,movieId,rating,timestamp
//!
//! Both files carry a header row. Titles may contain commas and are quoted
//! in that case, so we go through the `csv` crate rather than splitting lines.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub const MOVIES_FILE: &str = "movies.csv";
pub const RATINGS_FILE: &str = "ratings.csv";

/// Row layout of movies.csv
#[derive(Debug, Deserialize)]
struct MovieRecord {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    genres: String,
}

/// Row layout of ratings.csv
#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f32,
    timestamp: i64,
}

fn csv_error(file: &str) -> impl Fn(csv::Error) -> DataLoadError + '_ {
    move |source| DataLoadError::Csv {
        file: file.to_string(),
        source,
    }
}

/// Parse the movies.csv file
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = File::open(path)?;
    parse_movies_from_reader(file)
}

/// Parse movies from any reader holding movies.csv content
pub fn parse_movies_from_reader<R: Read>(reader: R) -> Result<Vec<Movie>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut movies = Vec::new();
    for record in rdr.deserialize::<MovieRecord>() {
        let record = record.map_err(csv_error(MOVIES_FILE))?;
        movies.push(Movie {
            id: record.movie_id,
            title: record.title,
            genres: parse_genres(&record.genres),
        });
    }
    Ok(movies)
}

/// Parse the ratings.csv file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = File::open(path)?;
    parse_ratings_from_reader(file)
}

/// Parse ratings from any reader holding ratings.csv content
pub fn parse_ratings_from_reader<R: Read>(reader: R) -> Result<Vec<Rating>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut ratings = Vec::new();
    for record in rdr.deserialize::<RatingRecord>() {
        let record = record.map_err(csv_error(RATINGS_FILE))?;
        if !(MIN_RATING..=MAX_RATING).contains(&record.rating) {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: record.rating.to_string(),
            });
        }
        ratings.push(Rating {
            user_id: record.user_id,
            movie_id: record.movie_id,
            rating: record.rating,
            timestamp: record.timestamp,
        });
    }
    Ok(ratings)
}

/// Lazily yields the first `n_lines` data lines of a file, skipping the header.
///
/// Nothing past the requested lines is read, so this is cheap on large files.
pub fn preview_lines(
    path: &Path,
    n_lines: usize,
) -> Result<impl Iterator<Item = Result<String>> + use<>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(reader
        .lines()
        .skip(1)
        .take(n_lines)
        .map(|line| line.map_err(DataLoadError::from)))
}

/// Split pipe-separated genres
///
/// Example: "Action|Adventure|Sci-Fi" -> ["Action", "Adventure", "Sci-Fi"]
fn parse_genres(s: &str) -> Vec<String> {
    s.split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_movies_with_quoted_title() {
        let input = "movieId,title,genres\n\
                     1,Toy Story (1995),Adventure|Animation|Children\n\
                     11,\"American President, The (1995)\",Comedy|Drama|Romance\n";

        let movies = parse_movies_from_reader(input.as_bytes()).unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].genres, vec!["Adventure", "Animation", "Children"]);
        assert_eq!(movies[1].id, 11);
        assert_eq!(movies[1].title, "American President, The (1995)");
    }

    #[test]
    fn test_parse_ratings() {
        let input = "userId,movieId,rating,timestamp\n1,1,4.0,964982703\n1,3,0.5,964981247\n";

        let ratings = parse_ratings_from_reader(input.as_bytes()).unwrap();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].user_id, 1);
        assert_eq!(ratings[1].rating, 0.5);
        assert_eq!(ratings[1].timestamp, 964981247);
    }

    #[test]
    fn test_parse_ratings_rejects_out_of_range() {
        let input = "userId,movieId,rating,timestamp\n1,1,6.0,964982703\n";
        let result = parse_ratings_from_reader(input.as_bytes());
        assert!(matches!(result, Err(DataLoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_ratings_reports_malformed_row() {
        let input = "userId,movieId,rating,timestamp\n1,abc,4.0,964982703\n";
        let result = parse_ratings_from_reader(input.as_bytes());
        match result {
            Err(DataLoadError::Csv { file, .. }) => assert_eq!(file, RATINGS_FILE),
            other => panic!("expected csv error, got {:?}", other),
        }
    }

    #[test]
    fn test_preview_lines_skips_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "movieId,title,genres").unwrap();
        for i in 0..10 {
            writeln!(file, "{i},Movie {i},Drama").unwrap();
        }

        let lines: Vec<String> = preview_lines(file.path(), 3)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(lines, vec!["0,Movie 0,Drama", "1,Movie 1,Drama", "2,Movie 2,Drama"]);
    }

    #[test]
    fn test_parse_genres() {
        assert_eq!(parse_genres("Action|Sci-Fi"), vec!["Action", "Sci-Fi"]);
        assert_eq!(parse_genres("(no genres listed)"), vec!["(no genres listed)"]);
    }
}
