//! Shared "current URL" cell.
//!
//! Whichever worker most recently started a fetch overwrites the value; the
//! telemetry sampler reads it. Values are swapped whole under a write lock, so
//! a reader sees either the old or the new URL, never a mix.

use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
pub struct CursorCell {
    current: RwLock<Arc<str>>,
}

impl Default for CursorCell {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorCell {
    /// Starts out empty (no fetch has begun yet).
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::from("")),
        }
    }

    /// Record `url` as the one in flight.
    pub fn publish(&self, url: Arc<str>) {
        // A panicked writer can only have left a complete value behind.
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = url;
    }

    /// The most recently published URL, or "" before the first publish.
    pub fn current(&self) -> Arc<str> {
        let slot = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot)
    }
}
