//! # notifyhub
//!
//! **notifyhub** is a small in-process publish/notify registry.
//!
//! Subjects own (or share) a [`Registry`] and call [`Registry::publish`] when
//! their state changes; observers implement [`Subscribe`] (or pass a closure)
//! and register against a [`Topic`]. Nothing has to extend a base type.
//!
//! ## Architecture
//! ```text
//!  ┌──────────────┐          ┌──────────────┐   ┌──────────────┐
//!  │   Subject    │          │  Subscriber  │   │  Subscriber  │
//!  │ (publisher)  │          │  (display)   │   │   (stats)    │
//!  └──────┬───────┘          └──────┬───────┘   └──────┬───────┘
//!         │ publish(topic, &p)      │ subscribe(topic) │
//!         ▼                         ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Registry<P>                                                  │
//! │  - Mutex<HashMap<Topic, Vec<Entry>>>  (ordered per topic)     │
//! │  - Config (log_failures, catch_panics, bus_capacity)          │
//! │  - FailureHook (optional)                                     │
//! │  - Bus (diagnostic events)                                    │
//! └──────┬─────────────────────────────────────────────────┬──────┘
//!        │ snapshot under lock, deliver without it         │
//!        ▼                                                 ▼
//!   sub1.on_event(&p)  sub2.on_event(&p) ...        Event stream
//!        │                                          (Subscribed, Published,
//!        └─ Err / panic → HandlerFailure             HandlerFailed, ...)
//!                         → PublishReport
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                                  |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Registry**      | Subscribe, unsubscribe, snapshot publish per topic.          | [`Registry`], [`Topic`]                    |
//! | **Subscribers**   | Capability trait, closure adapter, built-in subscribers.     | [`Subscribe`], [`SubscriberFn`], [`Recorder`] |
//! | **Handles**       | Opaque per-registration identity, RAII guards.               | [`SubscriptionHandle`], [`SubscriptionGuard`] |
//! | **Errors**        | Isolated handler failures collected after each pass.         | [`HandlerError`], [`PublishReport`], [`PublishError`] |
//! | **Diagnostics**   | Broadcast stream of registry lifecycle events.               | [`Event`], [`EventKind`]                   |
//! | **Configuration** | Failure logging, panic isolation, bus capacity.              | [`Config`], [`RegistryBuilder`]            |
//!
//! ## Optional features
//! - `logging` (default): exports the [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use notifyhub::{HandlerError, Recorder, Registry};
//!
//! let registry: Registry<f32> = Registry::new();
//!
//! let history = Arc::new(Recorder::<f32>::new());
//! registry.subscribe("temperature", history.clone());
//! let alarm = registry.subscribe_fn("temperature", "alarm", |t| {
//!     if *t > 40.0 {
//!         return Err(HandlerError::fail(format!("too hot: {t}")));
//!     }
//!     Ok(())
//! });
//!
//! let report = registry.publish("temperature", &45.0);
//! assert_eq!(report.delivered, 2);
//! assert_eq!(report.failures.len(), 1);
//! assert_eq!(history.snapshot(), vec![45.0]);
//!
//! registry.unsubscribe(&alarm);
//! assert!(registry.publish("temperature", &20.0).is_ok());
//! ```
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use core::{
    Config, FailureHook, HandlerFailure, PublishReport, Registry, RegistryBuilder,
    SubscriptionGuard, SubscriptionHandle, SubscriptionId, Topic, WeakRegistry, GLOBAL_TOPIC,
};
pub use error::{HandlerError, PublishError};
pub use events::{Event, EventKind};
pub use subscribers::{Recorder, Subscribe, SubscriberFn, SubscriberRef};

// Optional: expose a tracing-backed payload logger.
// Enabled by default; disable with `--no-default-features`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
