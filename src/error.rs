//! Error types for the chunking tool.
//!
//! The chunking engine itself is infallible; these errors come from the
//! file system, configuration and serialization layers around it.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for chunking operations.
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// I/O errors, tagged with the path being read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Token budgets that cannot be satisfied
    #[error("Invalid token budget: min_tokens={min_tokens}, max_tokens={max_tokens}")]
    InvalidBudget { min_tokens: usize, max_tokens: usize },

    /// Characters-per-token ratio that is not a positive number
    #[error("Invalid characters-per-token ratio: {0}")]
    InvalidRatio(f64),

    /// A book directory that does not exist under the chapters root
    #[error("Book directory not found: {0}")]
    MissingBookDir(PathBuf),
}

impl ChunkerError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChunkerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for chunking operations
pub type Result<T> = std::result::Result<T, ChunkerError>;
