//! Error types for schema inference.

use std::path::PathBuf;

use stager_split::SplitError;
use thiserror::Error;

/// Errors that can occur while inferring a table schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Input resolution or delimiter detection failed.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// Sample rows must be at least one.
    #[error("invalid schema options: {reason}")]
    InvalidOptions { reason: String },

    /// Failed to read the sample.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or re-serialize sample records.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Polars rejected the sample.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// The file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
