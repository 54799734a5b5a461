//! Error types for cleaning and splitting CSV files.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while preparing CSV parts.
#[derive(Debug, Error)]
pub enum SplitError {
    // === Invalid Input ===
    /// Source file does not exist.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Input path is neither a file nor a directory.
    #[error("input path is not a file or directory: {path}")]
    InvalidInputPath { path: PathBuf },

    /// Input directory holds no CSV file.
    #[error("no CSV files found in {path}")]
    NoCsvFiles { path: PathBuf },

    /// Options failed validation.
    #[error("invalid split options: {reason}")]
    InvalidOptions { reason: String },

    /// Encoding label is unknown or cannot carry CSV delimiters as single bytes.
    #[error("unsupported encoding '{label}'")]
    UnsupportedEncoding { label: String },

    /// Output directory would swallow the source file when it is recreated.
    #[error("output directory {output_dir} contains the source file {source_path}")]
    OutputContainsSource {
        output_dir: PathBuf,
        source_path: PathBuf,
    },

    /// The cleaned copy would overwrite the file it is cleaned from.
    #[error("cleaned file would overwrite its source: {path}")]
    CleanTargetIsSource { path: PathBuf },

    // === File System Errors ===
    /// Failed to read a directory listing.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to remove an existing output directory.
    #[error("failed to remove directory {path}: {source}")]
    DirectoryRemove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create the output directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create or write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // === CSV Errors ===
    /// Delimiter sniffing could not settle on a single character.
    #[error("could not determine delimiter of {path}")]
    DelimiterUndetectable { path: PathBuf },

    /// CSV file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Failed to parse or serialize a CSV record.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl SplitError {
    /// Maps an open/read failure, keeping "not found" distinct.
    pub fn read(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true for errors caused by bad arguments rather than I/O.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::InvalidInputPath { .. }
                | Self::NoCsvFiles { .. }
                | Self::InvalidOptions { .. }
                | Self::UnsupportedEncoding { .. }
                | Self::OutputContainsSource { .. }
                | Self::CleanTargetIsSource { .. }
        )
    }
}

/// Failure modes of delimiter sniffing, before a path is attached.
#[derive(Debug, Error)]
pub enum SniffError {
    /// Reading the sample or rewinding the stream failed.
    #[error("failed to sample stream: {0}")]
    Io(#[from] io::Error),

    /// The sample is too irregular to infer a delimiter.
    #[error("delimiter undetectable")]
    Undetectable,
}

/// Result type for split operations.
pub type Result<T> = std::result::Result<T, SplitError>;
