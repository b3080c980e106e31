//! Per-diagram write guard.
//!
//! At most one write (modification batch, chat turn, replace, rename, delete)
//! is in flight per (owner, diagram). Requests naming another owner's diagram
//! id never block the real owner. A second writer is refused immediately
//! rather than queued; the permit is released when it is dropped, including
//! on early return or error.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

type GuardKey = (String, Uuid);

#[derive(Clone, Default)]
pub struct BatchGuards {
    busy: Arc<Mutex<HashSet<GuardKey>>>,
}

impl BatchGuards {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `(owner, id)`, or `None` if another write holds it.
    #[must_use]
    pub fn try_acquire(&self, owner: &str, id: Uuid) -> Option<BatchPermit> {
        let key = (owner.to_string(), id);
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        if !busy.insert(key.clone()) {
            return None;
        }
        Some(BatchPermit { busy: Arc::clone(&self.busy), key })
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_busy(&self, owner: &str, id: Uuid) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(owner.to_string(), id))
    }
}

/// Exclusive claim on one diagram. Released on drop.
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct BatchPermit {
    busy: Arc<Mutex<HashSet<GuardKey>>>,
    key: GuardKey,
}

impl Drop for BatchPermit {
    fn drop(&mut self) {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
