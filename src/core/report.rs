//! # Outcome of one publish pass.

use std::sync::Arc;

use super::handle::SubscriptionId;
use super::topic::Topic;
use crate::error::{HandlerError, PublishError};

/// One handler that failed during a publish pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Registration that failed.
    pub subscription: SubscriptionId,
    /// Subscriber name as reported by `Subscribe::name`.
    pub subscriber: Arc<str>,
    /// What went wrong.
    pub error: HandlerError,
}

/// Summary returned by `publish` once every snapshotted handler has run.
///
/// - `delivered`: number of handlers invoked (size of the snapshot)
/// - `failures`: handlers that returned an error or panicked, in delivery order
#[derive(Clone, Debug)]
#[must_use = "the report carries handler failures; inspect it or call `into_result`"]
pub struct PublishReport {
    pub topic: Topic,
    pub delivered: usize,
    pub failures: Vec<HandlerFailure>,
}

impl PublishReport {
    pub(crate) fn empty(topic: Topic) -> Self {
        Self {
            topic,
            delivered: 0,
            failures: Vec::new(),
        }
    }

    /// Returns `true` if no handler failed.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of handlers that completed without error.
    #[inline]
    pub fn succeeded(&self) -> usize {
        self.delivered.saturating_sub(self.failures.len())
    }

    /// Converts collected failures into an error.
    ///
    /// Returns the number of handlers invoked on success.
    pub fn into_result(self) -> Result<usize, PublishError> {
        if self.failures.is_empty() {
            Ok(self.delivered)
        } else {
            Err(PublishError::HandlersFailed {
                topic: self.topic,
                attempted: self.delivered,
                failures: self.failures,
            })
        }
    }
}
