//! Error types used by the registry and its subscribers.
//!
//! This module defines two error enums:
//!
//! - [`HandlerError`] — returned (or synthesized from a panic) by a single subscriber.
//! - [`PublishError`] — raised for a whole publish pass.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

use crate::core::{HandlerFailure, Topic};

/// # Errors produced by a subscriber while handling one payload.
///
/// A failing subscriber never aborts delivery to the others; its error is
/// collected into [`PublishReport::failures`](crate::PublishReport::failures).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Subscriber rejected or failed to process the payload.
    #[error("handler failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Subscriber panicked; the panic was caught by the registry.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`].
    ///
    /// # Example
    /// ```
    /// use notifyhub::HandlerError;
    ///
    /// let err = HandlerError::fail("display offline");
    /// assert_eq!(err.to_string(), "handler failed: display offline");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Returns `true` if the error was synthesized from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }
}

/// # Errors produced by a publish pass.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PublishError {
    /// One or more handlers failed; the rest of the snapshot was still delivered.
    #[error("{} of {attempted} handlers failed on topic '{topic}'", .failures.len())]
    HandlersFailed {
        /// Topic the payload was published to.
        topic: Topic,
        /// Number of handlers invoked.
        attempted: usize,
        /// Per-handler failures, in delivery order.
        failures: Vec<HandlerFailure>,
    },

    /// A detached delivery task could not be joined.
    #[error("detached delivery did not complete: {reason}")]
    Join {
        /// Join error rendered as text.
        reason: String,
    },
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use notifyhub::PublishError;
    ///
    /// let err = PublishError::Join { reason: "cancelled".into() };
    /// assert_eq!(err.as_label(), "publish_join_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::HandlersFailed { .. } => "publish_handlers_failed",
            PublishError::Join { .. } => "publish_join_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PublishError::HandlersFailed {
                topic,
                attempted,
                failures,
            } => {
                let names: Vec<&str> = failures.iter().map(|f| f.subscriber.as_ref()).collect();
                format!("topic={topic} attempted={attempted} failed={names:?}")
            }
            PublishError::Join { reason } => format!("join: {reason}"),
        }
    }
}
