//! Engine error taxonomy
//!
//! AI-tier errors never propagate past the suggestion engine and
//! reconciliation errors never propagate past the reconciler: both resolve
//! to a degraded result with a human-readable status. These variants exist
//! for the boundaries in between.

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised inside the MyLook core
#[derive(Debug, Error)]
pub enum EngineError {
    /// Network request failed or timed out
    #[error("Network failure: {0}")]
    Network(String),

    /// Remote endpoint answered with a non-success status
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be coerced into the expected JSON shape
    #[error("Parse failure: {0}")]
    Parse(String),

    /// Caller violated an operation precondition
    #[error("Precondition failure: {0}")]
    Precondition(String),

    /// Local cache error
    #[error("Cache error: {0}")]
    Cache(#[from] sqlx::Error),

    /// Shared library error
    #[error(transparent)]
    Common(#[from] mylook_common::Error),
}

impl EngineError {
    /// Fold a reqwest failure into the taxonomy: timeouts and transport
    /// errors are network failures, anything else is an API error.
    pub fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            EngineError::Network(format!("{}: {}", context, err))
        } else {
            EngineError::Api(format!("{}: {}", context, err))
        }
    }
}
