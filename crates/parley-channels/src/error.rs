//! Error types for parley-channels

use thiserror::Error;

/// Channel error type
#[derive(Debug, Error)]
pub enum Error {
    /// Discord API or gateway error
    #[error("discord error: {0}")]
    Discord(String),

    /// Id parsing error
    #[error("message parsing error: {0}")]
    Parse(String),

    /// Used before the gateway connection was established
    #[error("not connected")]
    NotConnected,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for parley_core::Error {
    fn from(e: Error) -> Self {
        parley_core::Error::Transport(e.to_string())
    }
}
