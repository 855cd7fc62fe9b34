//! # Recorder – keep every payload received
//!
//! Stores a clone of each payload in arrival order. Useful for tests and for
//! displays that need the full history rather than only the latest value.
//!
//! ## Internal scheme
//! ```text
//! on_event(p):   push(p.clone())
//! snapshot():    Vec<P> (copy of the history, oldest first)
//! clear():       drop the history
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::HandlerError;
use crate::subscribers::Subscribe;

/// Subscriber that records the payloads it receives.
pub struct Recorder<P> {
    inner: Mutex<Vec<P>>,
    label: &'static str,
}

impl<P: Clone> Recorder<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            label: "Recorder",
        }
    }

    /// Sets the name reported in failure reports and diagnostic events.
    #[must_use]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Returns a copy of the recorded payloads, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<P> {
        self.lock().clone()
    }

    /// Returns the most recent payload, if any.
    #[must_use]
    pub fn last(&self) -> Option<P> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: Clone> Default for Recorder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Subscribe<P> for Recorder<P>
where
    P: Clone + Send + 'static,
{
    fn on_event(&self, payload: &P) -> Result<(), HandlerError> {
        self.lock().push(payload.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        self.label
    }
}
