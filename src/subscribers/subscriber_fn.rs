//! # Function-backed subscriber (`SubscriberFn`)
//!
//! [`SubscriberFn`] wraps a closure `F: Fn(&P) -> Result<(), HandlerError>` and
//! gives it a name, so plain closures can be registered next to full
//! [`Subscribe`] implementations.
//!
//! Shared state goes into the closure explicitly (`Arc<...>`); the closure is
//! `Fn`, not `FnMut`, because it can be invoked from several threads at once.
//!
//! ## Example
//! ```rust
//! use notifyhub::{HandlerError, Subscribe, SubscriberFn, SubscriberRef};
//!
//! let s: SubscriberRef<String> = SubscriberFn::arc("printer", |msg: &String| {
//!     println!("{msg}");
//!     Ok::<_, HandlerError>(())
//! });
//!
//! assert_eq!(s.name(), "printer");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::subscribers::Subscribe;

/// Named closure subscriber.
pub struct SubscriberFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SubscriberFn<F> {
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscriberFn::arc`] when you immediately need a [`SubscriberRef`](crate::SubscriberRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> fmt::Debug for SubscriberFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberFn")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<P, F> Subscribe<P> for SubscriberFn<F>
where
    P: ?Sized + 'static,
    F: Fn(&P) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn on_event(&self, payload: &P) -> Result<(), HandlerError> {
        (self.f)(payload)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
