//! Error types for parley-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Tool not found
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Tool execution failed
    #[error("execution failed: {0}")]
    Execution(String),

    /// Memory store failure
    #[error("memory error: {0}")]
    Memory(#[from] parley_memory::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
