//! Error types for action primitives

use action_locator::SelectorError;
use inpage_dom::DomError;
use thiserror::Error;

/// Failures of the driver-facing surface. Expected terminal conditions of an
/// action (detached node, wrong element type, ...) are outcome tags, not errors.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Selector resolution failed structurally
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// A file payload could not be decoded
    #[error("Invalid file payload \"{name}\": {reason}")]
    InvalidFilePayload { name: String, reason: String },

    /// The host document rejected a mutation
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}

impl ActionError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ActionError::Selector(err) => err.is_retryable(),
            ActionError::InvalidFilePayload { .. } | ActionError::Dom(_) => false,
        }
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::Selector(err) => err.severity(),
            ActionError::InvalidFilePayload { .. } => 1,
            ActionError::Dom(_) => 3,
        }
    }
}
