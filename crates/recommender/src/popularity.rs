//! Popularity baseline: one cluster holding every user.
//!
//! Items are ranked by their mean rating over the whole matrix, so every user
//! gets the same list. Useful as a sanity baseline for the K-Means model.

use crate::engine::{column_means, rank_items};
use crate::error::{RecommenderError, Result};
use crate::state::{ClusterAssignment, DEFAULT_PROFILE_SIZE, RecommenderState};
use crate::traits::Recommender;
use data_loader::RatingMatrix;
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct PopularityRecommender {
    profile_size: usize,
}

impl PopularityRecommender {
    pub fn new() -> Self {
        Self {
            profile_size: DEFAULT_PROFILE_SIZE,
        }
    }

    /// Configure how many items the shared profile keeps (default: 20)
    pub fn with_profile_size(mut self, profile_size: usize) -> Self {
        self.profile_size = profile_size;
        self
    }
}

impl Default for PopularityRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender for PopularityRecommender {
    fn name(&self) -> &str {
        "PopularityRecommender"
    }

    #[instrument(skip(self, matrix))]
    fn train(&self, matrix: &RatingMatrix) -> Result<RecommenderState> {
        let (users, items) = matrix.shape();
        if users == 0 || items == 0 {
            return Err(RecommenderError::InsufficientData {
                users,
                items,
                clusters: 1,
            });
        }

        let rows: Vec<usize> = (0..users).collect();
        let profile = rank_items(matrix, &column_means(matrix, &rows), self.profile_size);
        let assignment =
            ClusterAssignment::from_labels(matrix.users().iter().map(|&user| (user, 0)).collect());

        info!("Popularity profile built from {} users", users);
        Ok(RecommenderState::from_parts(
            1,
            0,
            assignment,
            BTreeMap::from([(0, profile)]),
            true,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everyone_gets_global_ranking() {
        let matrix = RatingMatrix::new(
            vec![1, 2, 3],
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![vec![1.0, 5.0, 0.0], vec![2.0, 4.0, 0.0], vec![3.0, 0.0, 5.0]],
        )
        .unwrap();

        let recommender = PopularityRecommender::new().with_profile_size(2);
        let state = recommender.train(&matrix).unwrap();

        assert_eq!(state.k(), 1);
        for user in 1..=3 {
            assert_eq!(recommender.recommend(&state, user, 5), vec!["B", "A"]);
        }
        assert!(recommender.recommend(&state, 42, 5).is_empty());
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let matrix = RatingMatrix::new(vec![], vec![], vec![]).unwrap();
        assert!(PopularityRecommender::new().train(&matrix).is_err());
    }
}
