//! Error types for the recommender crate.
//!
//! Note what is *not* here: an unknown user or an untrained model is not an
//! error. Lookups return an empty list and the caller decides what that means.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommenderError {
    /// The rating matrix cannot support the requested number of clusters
    #[error(
        "Insufficient data: {users} users x {items} items cannot be split into {clusters} clusters"
    )]
    InsufficientData {
        users: usize,
        items: usize,
        clusters: usize,
    },

    /// k must be at least 1
    #[error("Invalid cluster count: {0}")]
    InvalidClusterCount(usize),

    /// The clustering library rejected the input or failed to converge
    #[error("Clustering failed: {0}")]
    Clustering(String),

    /// A persisted model could not be decoded or violates the state invariants
    #[error("Corrupt model state: {0}")]
    CorruptState(String),

    /// A persisted model was written by an unknown format version
    #[error("Unsupported model format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The model artifact does not exist
    #[error("Model not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecommenderError>;
