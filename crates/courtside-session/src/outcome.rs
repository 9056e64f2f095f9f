//! What a session operation reports back.
//!
//! A mutation happens in two phases. First the game is changed in memory;
//! that either fails (and nothing changed) or succeeds. Then subscribers are
//! notified and the game is flushed. A flush failure is reported here and
//! never undoes the in-memory change.

use courtside_core::event::GameEvent;
use courtside_store::PersistenceError;

/// Result of the persistence phase.
#[derive(Debug)]
pub enum FlushStatus {
    /// The current game was written to storage.
    Saved,
    /// Nothing to write: the stored copy already matches.
    Unchanged,
    /// Held back by [`FlushPolicy::Deferred`](crate::FlushPolicy::Deferred).
    Deferred,
    /// The write failed. The in-memory game keeps the change and the session
    /// stays dirty, so the next flush retries.
    Failed(PersistenceError),
}

impl FlushStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, FlushStatus::Failed(_))
    }
}

/// A successful in-memory mutation plus its flush status.
#[derive(Debug)]
pub struct Outcome<T = GameEvent> {
    pub value: T,
    pub flush: FlushStatus,
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            flush: self.flush,
        }
    }
}
