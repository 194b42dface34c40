use uuid::Uuid;

/// Token a predicate returns to ask for another tick.
///
/// Every poll invocation allocates a fresh token and hands the same one to
/// each tick, so a returned token is recognised by identity only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Continuation {
    id: Uuid,
}

impl Continuation {
    pub(crate) fn fresh() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Keep polling
    pub fn proceed<T>(&self) -> Tick<T> {
        Tick::Continue(*self)
    }
}

/// What one predicate evaluation decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick<T> {
    /// Settle the poll with this value
    Done(T),
    /// Evaluate again on the next tick
    Continue(Continuation),
}

impl<T> Tick<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Tick::Done(_))
    }
}
