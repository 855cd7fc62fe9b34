//! # Built-in subscribers
//!
//! Small, self-contained implementations useful for demos and tests.
//!
//! - [`LogWriter`]: writes payloads to `tracing` (feature `logging`).
//! - [`Recorder`]: keeps a history of received payloads.

#[cfg(feature = "logging")]
mod log;
mod recorder;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use recorder::Recorder;
