use thiserror::Error;

/// Error taxonomy of the engine's public surface.
///
/// Storage internals use `anyhow` and surface here as `Storage`; the engine
/// never retries a failed storage call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("session '{0}' already exists")]
    Conflict(String),

    #[error("session '{0}' not found")]
    NotFound(String),

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }
}
