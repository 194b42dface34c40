//! Error types for selector resolution

use query_engines::EngineError;
use thiserror::Error;

/// Structural misuse of the resolver. "Nothing matched" is not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The query root is not a document, shadow root or element
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A selector part names an engine the registry does not hold
    #[error("Unknown selector engine \"{0}\"")]
    UnknownEngine(String),

    /// Capture index points past the last part
    #[error("Capture index {capture} out of range for {len} selector part(s)")]
    InvalidCapture { capture: usize, len: usize },

    /// A selector needs at least one part
    #[error("Selector has no parts")]
    EmptySelector,

    /// The engine rejected a part body
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SelectorError {
    /// Selector errors are deterministic; retrying the same call cannot help
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            SelectorError::InvalidArgument(_) => 2,
            SelectorError::UnknownEngine(_) | SelectorError::Engine(_) => 1,
            _ => 0,
        }
    }
}
