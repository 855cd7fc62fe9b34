//! # Subscribers: the receiving side of a registry.
//!
//! This module provides the [`Subscribe`] capability trait and built-in implementations.
//!
//! ## Architecture
//! ```text
//! Registry::publish(topic, &payload)
//!     │  snapshot (under lock)
//!     ├──► subscriber1.on_event(&payload) ──► Ok
//!     ├──► subscriber2.on_event(&payload) ──► Err / panic → HandlerFailure
//!     └──► subscriberN.on_event(&payload) ──► Ok
//!                                             (lock released during calls)
//! ```
//!
//! ## Subscriber types
//! - **Trait implementations**: any `Send + Sync + 'static` type implementing [`Subscribe`]
//! - **Closures**: wrapped by [`SubscriberFn`]
//! - **Built-ins**: [`LogWriter`], [`Recorder`]

mod embedded;
mod subscribe;
mod subscriber_fn;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use embedded::Recorder;
pub use subscribe::{Subscribe, SubscriberRef};
pub use subscriber_fn::SubscriberFn;
