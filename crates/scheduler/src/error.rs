use thiserror::Error;

/// Why a poll result was rejected. Aborted polls never settle, so
/// cancellation has no variant here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    /// The predicate returned an error
    #[error("{0}")]
    Predicate(String),

    /// The predicate panicked
    #[error("predicate panicked: {0}")]
    Panicked(String),

    /// The predicate handed back a continuation token it was not given
    #[error("predicate returned a continuation token of another poll")]
    ForeignContinuation,

    /// The poll task went away without settling (runtime shut down)
    #[error("poll task ended without settling")]
    TaskLost,
}

impl PollError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PollError::TaskLost)
    }
}
