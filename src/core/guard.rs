//! # Scoped subscriptions.
//!
//! [`SubscriptionGuard`] ties a registration to a value's lifetime: dropping the
//! guard unsubscribes. The guard only holds a weak reference, so it never keeps
//! the registry alive, and dropping it after the registry is gone is a no-op.

use std::fmt;

use super::handle::SubscriptionHandle;
use super::registry::WeakRegistry;

/// RAII registration returned by [`Registry::subscribe_scoped`](crate::Registry::subscribe_scoped).
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard<P: ?Sized + 'static> {
    handle: Option<SubscriptionHandle>,
    registry: WeakRegistry<P>,
}

impl<P: ?Sized + 'static> SubscriptionGuard<P> {
    pub(crate) fn new(handle: SubscriptionHandle, registry: WeakRegistry<P>) -> Self {
        Self {
            handle: Some(handle),
            registry,
        }
    }

    /// Handle of the guarded registration.
    pub fn handle(&self) -> Option<&SubscriptionHandle> {
        self.handle.as_ref()
    }

    /// Unsubscribes now; returns whether an entry was removed.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    /// Gives up the guard and keeps the registration alive.
    ///
    /// The returned handle can still be passed to `Registry::unsubscribe`.
    pub fn detach(mut self) -> Option<SubscriptionHandle> {
        self.handle.take()
    }

    fn release(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.unsubscribe(&handle))
    }
}

impl<P: ?Sized + 'static> Drop for SubscriptionGuard<P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<P: ?Sized + 'static> fmt::Debug for SubscriptionGuard<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
