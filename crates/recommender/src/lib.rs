//! # Recommender Crate
//!
//! Clustering-based movie recommendations.
//!
//! ## Components
//!
//! ### Clustering Engine
//! K-Means over user rating vectors (seeded, deterministic). For each cluster
//! the items are ranked by mean rating across its members and the top of that
//! ranking is stored as the cluster profile.
//!
//! ### Recommendation Lookup
//! A user's recommendations are the first `top_n` items of their cluster's
//! profile. Unknown users and untrained models get an empty list.
//!
//! ### Persistence
//! Versioned JSON snapshots of the trained state.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::MatrixBuilder;
//! use recommender::{persistence, train};
//!
//! let matrix = MatrixBuilder::new("data/raw").build()?;
//! let state = train(&matrix, 5, 42)?;
//! persistence::save_to_path(&state, Path::new("model_v1.json"))?;
//!
//! let titles = state.recommend(10, 5);
//! ```

pub mod error;
pub mod traits;
pub mod state;
pub mod engine;
pub mod popularity;
pub mod persistence;

// Re-export commonly used types
pub use error::{RecommenderError, Result};
pub use traits::Recommender;
pub use state::{
    ClusterAssignment, ClusterProfile, DEFAULT_PROFILE_SIZE, ProfileEntry, RecommenderState,
    is_fitted, recommend,
};
pub use engine::{ClusterRecommender, DEFAULT_CLUSTERS, DEFAULT_SEED, train};
pub use popularity::PopularityRecommender;
