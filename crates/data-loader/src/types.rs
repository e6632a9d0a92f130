//! Core domain types for the ratings dataset.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Type aliases for domain clarity (UserId, MovieId, ItemId)
//! - Parsed records (Movie, Rating)
//! - The dense RatingMatrix handed to the recommender

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie in `movies.csv`
pub type MovieId = u32;

/// Identifier of a matrix column. Columns are movie titles, so ratings of
/// movies that share a title are pooled and recommendations read naturally.
pub type ItemId = String;

/// Lowest rating a user can give
pub const MIN_RATING: f32 = 0.5;

/// Highest rating a user can give
pub const MAX_RATING: f32 = 5.0;

// =============================================================================
// Parsed Records
// =============================================================================

/// A movie from `movies.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Pipe-separated genres split into a list ("(no genres listed)" is kept as-is)
    pub genres: Vec<String>,
}

/// A single rating from a user for a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 0.5 to 5.0 in half-star steps
    pub rating: f32,
    /// Unix timestamp when rating was made
    pub timestamp: i64,
}

// =============================================================================
// RatingMatrix
// =============================================================================

/// Dense user × item rating grid.
///
/// Rows are users, columns are items, cells are ratings with `0.0` meaning
/// "unrated". Every row has exactly one cell per column; the constructor
/// rejects anything else so downstream code can index without checks.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    /// Row-major, `users.len() * items.len()` cells
    values: Vec<f32>,
    user_lookup: HashMap<UserId, usize>,
    item_lookup: HashMap<ItemId, usize>,
}

impl RatingMatrix {
    /// Build a matrix from explicit rows.
    ///
    /// `rows[i]` holds the ratings of `users[i]` in `items` order.
    pub fn new(users: Vec<UserId>, items: Vec<ItemId>, rows: Vec<Vec<f32>>) -> Result<Self> {
        if rows.len() != users.len() {
            return Err(DataLoadError::InvalidValue {
                field: "rows".to_string(),
                value: format!("{} rows for {} users", rows.len(), users.len()),
            });
        }

        let mut item_lookup = HashMap::with_capacity(items.len());
        for (column, item) in items.iter().enumerate() {
            if item_lookup.insert(item.clone(), column).is_some() {
                return Err(DataLoadError::DuplicateItem(item.clone()));
            }
        }

        let mut user_lookup = HashMap::with_capacity(users.len());
        for (row, &user_id) in users.iter().enumerate() {
            if user_lookup.insert(user_id, row).is_some() {
                return Err(DataLoadError::DuplicateUser(user_id));
            }
        }

        let mut values = Vec::with_capacity(users.len() * items.len());
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != items.len() {
                return Err(DataLoadError::ShapeMismatch {
                    row,
                    expected: items.len(),
                    found: cells.len(),
                });
            }
            for value in cells {
                if !value.is_finite() || !(0.0..=MAX_RATING).contains(&value) {
                    return Err(DataLoadError::InvalidValue {
                        field: "rating".to_string(),
                        value: value.to_string(),
                    });
                }
                values.push(value);
            }
        }

        Ok(Self {
            users,
            items,
            values,
            user_lookup,
            item_lookup,
        })
    }

    /// Row identifiers, in row order
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Column identifiers, in column order
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.users.len(), self.items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() || self.items.is_empty()
    }

    /// All cells in row-major order
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Ratings of the user stored at row `index`
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.users.len() {
            return None;
        }
        let width = self.items.len();
        Some(&self.values[index * width..(index + 1) * width])
    }

    /// Row position of a user
    pub fn user_index(&self, user_id: UserId) -> Option<usize> {
        self.user_lookup.get(&user_id).copied()
    }

    /// Column position of an item
    pub fn item_index(&self, item: &str) -> Option<usize> {
        self.item_lookup.get(item).copied()
    }

    /// Ratings of a user by id
    pub fn user_row(&self, user_id: UserId) -> Option<&[f32]> {
        self.user_index(user_id).and_then(|index| self.row(index))
    }

    /// Single cell lookup; `Some(0.0)` means the user exists but did not rate the item
    pub fn get(&self, user_id: UserId, item: &str) -> Option<f32> {
        let column = self.item_index(item)?;
        self.user_row(user_id).map(|row| row[column])
    }

    /// Number of non-zero cells
    pub fn rated_count(&self) -> usize {
        self.values.iter().filter(|&&v| v > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_matrix() -> RatingMatrix {
        RatingMatrix::new(
            vec![10, 20],
            vec!["Alien (1979)".to_string(), "Heat (1995)".to_string()],
            vec![vec![4.0, 0.0], vec![0.0, 3.5]],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let matrix = small_matrix();

        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.row(1), Some(&[0.0, 3.5][..]));
        assert_eq!(matrix.user_row(10), Some(&[4.0, 0.0][..]));
        assert_eq!(matrix.get(20, "Heat (1995)"), Some(3.5));
        assert_eq!(matrix.get(20, "Alien (1979)"), Some(0.0));
        assert_eq!(matrix.get(99, "Heat (1995)"), None);
        assert_eq!(matrix.rated_count(), 2);
        assert!(matrix.row(2).is_none());
    }

    #[test]
    fn test_item_index_matches_column_order() {
        let matrix = small_matrix();

        assert_eq!(matrix.item_index("Alien (1979)"), Some(0));
        assert_eq!(matrix.item_index("Heat (1995)"), Some(1));
        assert_eq!(matrix.item_index("Up (2009)"), None);
        assert_eq!(matrix.get(10, "Up (2009)"), None);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let result = RatingMatrix::new(
            vec![1, 2],
            vec!["A".to_string(), "B".to_string()],
            vec![vec![1.0, 2.0], vec![3.0]],
        );

        assert!(matches!(
            result,
            Err(DataLoadError::ShapeMismatch { row: 1, expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let duplicate_user = RatingMatrix::new(
            vec![1, 1],
            vec!["A".to_string()],
            vec![vec![1.0], vec![2.0]],
        );
        assert!(matches!(duplicate_user, Err(DataLoadError::DuplicateUser(1))));

        let duplicate_item = RatingMatrix::new(
            vec![1],
            vec!["A".to_string(), "A".to_string()],
            vec![vec![1.0, 2.0]],
        );
        assert!(matches!(duplicate_item, Err(DataLoadError::DuplicateItem(_))));
    }

    #[test]
    fn test_rejects_out_of_range_rating() {
        let result = RatingMatrix::new(vec![1], vec!["A".to_string()], vec![vec![7.0]]);
        assert!(matches!(result, Err(DataLoadError::InvalidValue { .. })));
    }
}
