//! # Diagnostic events emitted by the registry.
//!
//! The [`EventKind`] enum classifies what happened inside a registry:
//! - **Membership events**: subscribe/unsubscribe and topic creation/removal
//! - **Delivery events**: a publish pass finished, a handler failed or panicked
//!
//! The [`Event`] struct carries the metadata: timestamps, topic, subscriber
//! name, subscription id, and counters.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use notifyhub::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::HandlerFailed)
//!     .with_topic("weather")
//!     .with_subscriber("stats-display")
//!     .with_reason("division by zero");
//!
//! assert_eq!(ev.kind, EventKind::HandlerFailed);
//! assert_eq!(ev.topic.as_deref(), Some("weather"));
//! assert_eq!(ev.reason.as_deref(), Some("division by zero"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::core::{HandlerFailure, SubscriptionId};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of registry events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Membership ===
    /// A subscriber was registered.
    ///
    /// Sets:
    /// - `topic`, `subscriber`, `subscription`
    Subscribed,

    /// A registration was removed (explicitly, by guard drop, or by `clear_topic`).
    ///
    /// Sets:
    /// - `topic`, `subscriber`, `subscription`
    Unsubscribed,

    /// First subscriber arrived on a topic.
    ///
    /// Sets:
    /// - `topic`
    TopicCreated,

    /// Last subscriber left a topic; its list was dropped.
    ///
    /// Sets:
    /// - `topic`
    TopicDropped,

    // === Delivery ===
    /// A publish pass completed.
    ///
    /// Sets:
    /// - `topic`
    /// - `delivered`: handlers invoked
    /// - `failed`: handlers that failed
    Published,

    /// A handler returned an error.
    ///
    /// Sets:
    /// - `topic`, `subscriber`, `subscription`
    /// - `reason`: error message
    HandlerFailed,

    /// A handler panicked and the panic was caught.
    ///
    /// Sets:
    /// - `topic`, `subscriber`, `subscription`
    /// - `reason`: panic info
    HandlerPanicked,
}

/// Registry event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Topic the event relates to.
    pub topic: Option<Arc<str>>,
    /// Subscriber name, if applicable.
    pub subscriber: Option<Arc<str>>,
    /// Registration id, if applicable.
    pub subscription: Option<SubscriptionId>,
    /// Human-readable reason (errors, panic info).
    pub reason: Option<Arc<str>>,
    /// Handlers invoked by a publish pass.
    pub delivered: Option<u32>,
    /// Handlers that failed in a publish pass.
    pub failed: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            topic: None,
            subscriber: None,
            subscription: None,
            reason: None,
            delivered: None,
            failed: None,
        }
    }

    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[inline]
    pub fn with_subscriber(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(name.into());
        self
    }

    #[inline]
    pub fn with_subscription(mut self, id: SubscriptionId) -> Self {
        self.subscription = Some(id);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches publish counters (saturated to `u32`).
    #[inline]
    pub fn with_counts(mut self, delivered: usize, failed: usize) -> Self {
        self.delivered = Some(u32::try_from(delivered).unwrap_or(u32::MAX));
        self.failed = Some(u32::try_from(failed).unwrap_or(u32::MAX));
        self
    }

    /// Creates a `HandlerFailed` or `HandlerPanicked` event from a collected failure.
    pub(crate) fn handler_failure(topic: Arc<str>, failure: &HandlerFailure) -> Self {
        let kind = if failure.error.is_panic() {
            EventKind::HandlerPanicked
        } else {
            EventKind::HandlerFailed
        };
        Event::new(kind)
            .with_topic(topic)
            .with_subscriber(Arc::clone(&failure.subscriber))
            .with_subscription(failure.subscription)
            .with_reason(failure.error.as_message())
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::HandlerFailed | EventKind::HandlerPanicked
        )
    }
}
