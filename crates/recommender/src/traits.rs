//! Core trait for recommender variants.
//!
//! A variant knows how to turn a rating matrix into a [`RecommenderState`];
//! answering lookups is the state's job, so `recommend` has a default.

use crate::error::Result;
use crate::state::RecommenderState;
use data_loader::{ItemId, RatingMatrix, UserId};

/// Capability shared by every recommender variant.
///
/// `Send + Sync` lets a configured recommender be moved into a blocking
/// training task or shared by a server.
pub trait Recommender: Send + Sync {
    /// Returns the name of this recommender (for logging/debugging)
    fn name(&self) -> &str;

    /// Train on `matrix` and return a fitted state.
    ///
    /// The matrix is only borrowed; training has no side effects.
    fn train(&self, matrix: &RatingMatrix) -> Result<RecommenderState>;

    /// Look up recommendations in a trained state.
    ///
    /// Empty for an unfitted state, an unknown user or `top_n == 0`.
    fn recommend(&self, state: &RecommenderState, user_id: UserId, top_n: usize) -> Vec<ItemId> {
        state.recommend(user_id, top_n)
    }
}
