//! # Data Loader Crate
//!
//! This crate turns a MovieLens-style ratings dump into the dense rating
//! matrix the recommender trains on.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, RatingMatrix)
//! - **parser**: Parse movies.csv / ratings.csv into Rust structs
//! - **matrix**: Popularity filter and pivot into a RatingMatrix
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::MatrixBuilder;
//!
//! let matrix = MatrixBuilder::new("data/raw").with_min_votes(20).build()?;
//! let (users, items) = matrix.shape();
//! println!("{} users x {} titles", users, items);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod matrix;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use matrix::{DEFAULT_MIN_VOTES, MatrixBuilder};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    ItemId,
    // Core types
    Movie,
    Rating,
    RatingMatrix,
    // Rating bounds
    MIN_RATING,
    MAX_RATING,
};
