use std::marker::PhantomData;
use std::sync::Arc;

use super::{config::Config, registry::Registry, report::HandlerFailure, topic::Topic};

/// Callback invoked once per handler failure, after the publish pass completes.
pub type FailureHook = Arc<dyn Fn(&Topic, &HandlerFailure) + Send + Sync>;

/// Builder for constructing a [`Registry`] with optional behavior.
pub struct RegistryBuilder<P: ?Sized> {
    cfg: Config,
    on_failure: Option<FailureHook>,
    _payload: PhantomData<fn(&P)>,
}

impl<P: ?Sized + 'static> RegistryBuilder<P> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            on_failure: None,
            _payload: PhantomData,
        }
    }

    /// Sets a callback that receives every handler failure.
    ///
    /// The hook runs on the publishing thread after all handlers of the pass
    /// have been invoked, outside the registry lock. Failures are still
    /// returned in the [`PublishReport`](crate::PublishReport).
    pub fn with_failure_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Topic, &HandlerFailure) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    /// Builds and returns the registry.
    pub fn build(self) -> Registry<P> {
        Registry::from_parts(self.cfg, self.on_failure)
    }
}
