//! Registry diagnostics: event types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: `Registry` (membership changes, publish passes, handler failures).
//! - **Consumers**: anything holding a receiver from `Registry::events()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
