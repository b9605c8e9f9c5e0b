//! Error types for parley-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed persisted state
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Session persistence failure
    #[error("session error: {0}")]
    Session(String),

    /// Engine loop failure
    #[error("engine error: {0}")]
    Engine(String),

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] parley_llm::Error),

    /// Tool execution error
    #[error("tool error: {0}")]
    Tool(#[from] parley_tools::Error),

    /// Memory store error
    #[error("memory error: {0}")]
    Memory(#[from] parley_memory::Error),

    /// Transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short chat-safe description, appended to the engine-failure notice.
    ///
    /// Provider errors are already sanitized; everything else is reduced to a
    /// category so paths and raw payloads never reach the channel.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Error::Llm(parley_llm::Error::RateLimit) => {
                "rate limit exceeded, please try again later".to_string()
            }
            Error::Llm(parley_llm::Error::Network(_)) => "network problem".to_string(),
            Error::Llm(e) => e.to_string(),
            Error::Engine(msg) => msg.clone(),
            Error::Tool(_) => "a tool failed".to_string(),
            Error::Io(_) | Error::Json(_) | Error::Session(_) | Error::Memory(_) => {
                "storage problem".to_string()
            }
            Error::Transport(_) => "delivery problem".to_string(),
            Error::Configuration(_) => "configuration problem".to_string(),
        }
    }
}
