//! Common error types for Doctor Finder

use thiserror::Error;

/// Common result type for Doctor Finder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error conditions raised by the collaborators (store, identity, blobs)
/// and by configuration loading
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

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Sign-in rejected or session missing/expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Blob storage failure
    #[error("Storage error: {0}")]
    Blob(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
