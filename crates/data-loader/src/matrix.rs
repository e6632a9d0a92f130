//! RatingMatrix building: the ETL step.
//!
//! Steps:
//! 1. Parse movies.csv and ratings.csv (in parallel)
//! 2. Join ratings to movie titles
//! 3. Keep titles with more than `min_votes` ratings
//! 4. Pivot to a dense users × titles grid, zero-filled

use crate::error::{DataLoadError, Result};
use crate::parser::{self, MOVIES_FILE, RATINGS_FILE};
use crate::types::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Titles need strictly more ratings than this to become a matrix column
pub const DEFAULT_MIN_VOTES: usize = 20;

/// Builds a [`RatingMatrix`] from a directory holding movies.csv and ratings.csv
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    data_dir: PathBuf,
    min_votes: usize,
    preview: usize,
}

impl MatrixBuilder {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            min_votes: DEFAULT_MIN_VOTES,
            preview: 3,
        }
    }

    /// Configure the popularity threshold (default: 20)
    pub fn with_min_votes(mut self, min_votes: usize) -> Self {
        self.min_votes = min_votes;
        self
    }

    /// Number of movies.csv lines logged before parsing (default: 3, 0 disables)
    pub fn with_preview(mut self, lines: usize) -> Self {
        self.preview = lines;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Run the full ETL and return the matrix.
    ///
    /// Fails with [`DataLoadError::MissingSourceData`] when either file is absent.
    #[instrument(skip(self), fields(data_dir = %self.data_dir.display(), min_votes = self.min_votes))]
    pub fn build(&self) -> Result<RatingMatrix> {
        let start = Instant::now();
        let movies_path = self.data_dir.join(MOVIES_FILE);
        let ratings_path = self.data_dir.join(RATINGS_FILE);

        if !movies_path.exists() || !ratings_path.exists() {
            tracing::error!("Source files not found in {}", self.data_dir.display());
            return Err(DataLoadError::MissingSourceData {
                dir: self.data_dir.clone(),
            });
        }

        info!("Starting ETL from {}", self.data_dir.display());

        if self.preview > 0 {
            for line in parser::preview_lines(&movies_path, self.preview)? {
                debug!("movies.csv sample: {}", line?);
            }
        }

        // Both files are independent, parse them side by side
        let (movies, ratings) = rayon::join(
            || parser::parse_movies(&movies_path),
            || parser::parse_ratings(&ratings_path),
        );
        let movies = movies?;
        let ratings = ratings?;

        info!("Parsed {} movies and {} ratings", movies.len(), ratings.len());

        let matrix = RatingMatrix::from_ratings(&movies, &ratings, self.min_votes)?;

        info!(
            "ETL finished in {:.2?}, matrix shape {:?}",
            start.elapsed(),
            matrix.shape()
        );
        Ok(matrix)
    }
}

impl RatingMatrix {
    /// Pivot parsed records into a dense matrix.
    ///
    /// Ratings for unknown movie ids are dropped. When a user rated several
    /// movies sharing a title, the cell holds their mean. Columns are sorted by
    /// title, rows by user id; users left with no popular title disappear.
    pub fn from_ratings(movies: &[Movie], ratings: &[Rating], min_votes: usize) -> Result<Self> {
        let titles: HashMap<MovieId, &str> = movies
            .iter()
            .map(|movie| (movie.id, movie.title.as_str()))
            .collect();

        let joined: Vec<(UserId, &str, f32)> = ratings
            .iter()
            .filter_map(|r| titles.get(&r.movie_id).map(|&title| (r.user_id, title, r.rating)))
            .collect();

        let mut votes: HashMap<&str, usize> = HashMap::new();
        for &(_, title, _) in &joined {
            *votes.entry(title).or_insert(0) += 1;
        }

        let popular: BTreeSet<&str> = votes
            .iter()
            .filter(|&(_, &count)| count > min_votes)
            .map(|(&title, _)| title)
            .collect();

        info!(
            "Data reduction: {} -> {} titles (more than {} votes)",
            votes.len(),
            popular.len(),
            min_votes
        );

        let items: Vec<ItemId> = popular.iter().map(|title| title.to_string()).collect();
        let column_of: HashMap<&str, usize> = popular
            .iter()
            .enumerate()
            .map(|(column, &title)| (title, column))
            .collect();

        // user -> column -> (sum, count)
        let mut cells: BTreeMap<UserId, HashMap<usize, (f32, u32)>> = BTreeMap::new();
        for &(user_id, title, rating) in &joined {
            if let Some(&column) = column_of.get(title) {
                let cell = cells
                    .entry(user_id)
                    .or_default()
                    .entry(column)
                    .or_insert((0.0, 0));
                cell.0 += rating;
                cell.1 += 1;
            }
        }

        let width = items.len();
        let mut users = Vec::with_capacity(cells.len());
        let mut rows = Vec::with_capacity(cells.len());
        for (user_id, user_cells) in cells {
            let mut row = vec![0.0; width];
            for (column, (sum, count)) in user_cells {
                row[column] = sum / count as f32;
            }
            users.push(user_id);
            rows.push(row);
        }

        RatingMatrix::new(users, items, rows)
    }
}
