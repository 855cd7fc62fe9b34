//! # Registry configuration.
//!
//! Provides [`Config`], the data-only settings of a [`Registry`](crate::Registry).
//! Options that carry behavior (the failure hook) live on
//! [`RegistryBuilder`](crate::RegistryBuilder) instead.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]

/// Global configuration for a registry.
///
/// ## Field semantics
/// - `log_failures`: emit a `tracing::warn!` for each failed handler
/// - `catch_panics`: convert handler panics into [`HandlerError::Panicked`](crate::HandlerError::Panicked)
/// - `bus_capacity`: diagnostics ring buffer size (min 1)
///
/// Failures are always returned in the [`PublishReport`](crate::PublishReport),
/// regardless of these flags.
#[derive(Clone, Debug)]
pub struct Config {
    /// Log each handler failure at `warn` level after it happens.
    pub log_failures: bool,

    /// Isolate handler panics.
    ///
    /// - `true`: the panic is caught, reported as a failure, and delivery continues
    /// - `false`: the panic unwinds out of `publish` (remaining handlers are skipped);
    ///   failures collected earlier in the pass are logged and passed to the hook first
    pub catch_panics: bool,

    /// Capacity of the diagnostics broadcast channel.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `RecvError::Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `log_failures = true`
    /// - `catch_panics = true`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            log_failures: true,
            catch_panics: true,
            bus_capacity: 1024,
        }
    }
}
