//! Error types for query engines

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The selector body is malformed for this engine
    #[error("Invalid {engine} selector \"{body}\": {reason}")]
    InvalidSelector {
        engine: String,
        body: String,
        reason: String,
    },

    /// A custom engine failed while evaluating a well-formed body
    #[error("Query engine {engine} failed: {message}")]
    Failed { engine: String, message: String },
}

impl EngineError {
    pub fn invalid(engine: &str, body: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidSelector {
            engine: engine.to_string(),
            body: body.to_string(),
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
