//! # Subscription identity.
//!
//! Every call to `subscribe` mints a fresh [`SubscriptionId`] from a process-wide
//! counter. Ids are never reused, so a handle from one registry can never remove
//! an entry from another, and registering the same subscriber twice yields two
//! independent handles.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::topic::Topic;

/// Global counter for subscription ids (0 is never issued).
static SUBSCRIPTION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of one registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        Self(SUBSCRIPTION_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value (for logs/metrics).
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Opaque handle returned by `subscribe`, used to unsubscribe later.
///
/// Two handles are equal only if they came from the same `subscribe` call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    topic: Topic,
}

impl SubscriptionHandle {
    pub(crate) fn new(id: SubscriptionId, topic: Topic) -> Self {
        Self { id, topic }
    }

    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Topic this registration belongs to.
    #[inline]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }
}
