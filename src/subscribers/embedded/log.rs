//! # LogWriter — payload logger
//!
//! A minimal subscriber that writes every payload it receives to `tracing`
//! at `info` level. Use it for demos or to trace a topic while debugging.
//!
//! ## Example output (with `tracing-subscriber`'s fmt layer)
//! ```text
//! INFO notifyhub::log: notification subscriber="weather-log" payload=Reading { temperature: 21.5, .. }
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::error::HandlerError;
use crate::subscribers::Subscribe;

/// Payload writer subscriber.
#[derive(Clone, Debug)]
pub struct LogWriter {
    label: Cow<'static, str>,
}

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: Cow::Borrowed("LogWriter"),
        }
    }

    /// Sets the name reported in log lines and failure reports.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Subscribe<P> for LogWriter
where
    P: fmt::Debug + ?Sized + 'static,
{
    fn on_event(&self, payload: &P) -> Result<(), HandlerError> {
        tracing::info!(
            target: "notifyhub::log",
            subscriber = %self.label,
            payload = ?payload,
            "notification"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.label
    }
}
