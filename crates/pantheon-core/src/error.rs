//! Error types for the companion engine.

use std::time::Duration;

use thiserror::Error;

/// Result alias for per-turn operations.
pub type CompanionResult<T> = Result<T, CompanionError>;

/// Failures that reach the caller of [`crate::CompanionService`].
#[derive(Error, Debug)]
pub enum CompanionError {
    /// Malformed input; nothing was generated.
    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompanionError {
    /// HTTP status the gateway should answer with.
    pub fn status_hint(&self) -> u16 {
        match self {
            CompanionError::Validation(_) => 400,
            CompanionError::Internal(_) => 500,
        }
    }
}

/// Text generator failures. Always recovered with a fallback reply.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Generator disabled (offline mode)")]
    Disabled,

    #[error("Generator timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generator request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Generator returned {0}: {1}")]
    Status(u16, String),

    #[error("Generator response parse error: {0}")]
    Parse(String),

    #[error("Generator returned an empty reply")]
    EmptyReply,
}
