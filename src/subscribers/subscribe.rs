//! # Subscriber capability trait.
//!
//! [`Subscribe`] is the only thing a type needs to receive notifications. There
//! is no base type to extend: displays, loggers and test probes all just
//! implement this trait and are registered with a `Registry`.
//!
//! ## Rules
//! - Called synchronously from the thread that runs `publish`, outside the
//!   registry lock. Re-entrant calls into the registry are allowed.
//! - Return `Err` to report a failure; other subscribers still receive the payload.
//! - Panics are caught when `Config::catch_panics` is set and reported as
//!   `HandlerError::Panicked`.
//!
//! ## Example
//! ```rust
//! use notifyhub::{HandlerError, Subscribe};
//!
//! struct Thermometer;
//!
//! impl Subscribe<f32> for Thermometer {
//!     fn on_event(&self, celsius: &f32) -> Result<(), HandlerError> {
//!         if celsius.is_nan() {
//!             return Err(HandlerError::fail("reading is NaN"));
//!         }
//!         println!("{celsius:.1}°C");
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "thermometer" }
//! }
//! ```

use std::sync::Arc;

use crate::error::HandlerError;

/// Handler for payloads of type `P`.
pub trait Subscribe<P: ?Sized>: Send + Sync + 'static {
    /// Processes a single payload.
    fn on_event(&self, payload: &P) -> Result<(), HandlerError>;

    /// Returns the subscriber name used in logs, failure reports and diagnostic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a subscriber.
pub type SubscriberRef<P> = Arc<dyn Subscribe<P>>;
