//! Error types for parley-memory

use thiserror::Error;

/// Memory store error type
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed memory file
    #[error("malformed memory file: {0}")]
    Json(#[from] serde_json::Error),

    /// User identifier that cannot be used as a file name
    #[error("invalid user identifier: {0:?}")]
    InvalidUser(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
