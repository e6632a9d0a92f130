//! Error types for the data-loader crate.
//!
//! Every failure the ETL step can report is a variant of [`DataLoadError`].
//! The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
//! and `Display` from the `#[error(...)]` attributes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading ratings and building the matrix
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// `movies.csv` or `ratings.csv` is missing from the data directory
    #[error("Missing movies.csv or ratings.csv in {}", dir.display())]
    MissingSourceData { dir: PathBuf },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A CSV row couldn't be read or deserialized
    ///
    /// The csv error already carries the line/byte position
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A matrix row does not have one cell per item column
    #[error("Row {row} has {found} cells but the matrix has {expected} columns")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The same user appears twice in the row index
    #[error("Duplicate user {0} in rating matrix")]
    DuplicateUser(u32),

    /// The same item appears twice in the column index
    #[error("Duplicate item '{0}' in rating matrix")]
    DuplicateItem(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
