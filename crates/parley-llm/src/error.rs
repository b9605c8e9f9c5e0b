//! Error types for parley-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured (missing credential, bad client setup)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Provider name not present in the catalog
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// Model selector is not of the form `provider/model`
    #[error("invalid model format: {0} (use provider/model)")]
    InvalidModel(String),

    /// API error
    #[error("api error: {0}")]
    Api(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit,

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
