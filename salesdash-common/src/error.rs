//! Common error types for SalesDash

use thiserror::Error;

/// Common result type for SalesDash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across SalesDash services
///
/// Row-level ingest problems are not errors in this sense: the pipeline
/// records and counts them in the run summary and keeps going. Only
/// conditions that abort a whole run surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A whole data source is missing or unreadable; fatal for the run
    #[error("Source unavailable: {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a `SourceUnavailable` error for a named source
    pub fn source_unavailable(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            source_name: source.into(),
            reason: reason.into(),
        }
    }
}
