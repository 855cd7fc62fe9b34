//! Registry core: topics, handles, delivery.
//!
//! The public API from this module is [`Registry`] and the types that flow
//! through it.
//!
//! Internal modules:
//! - [`registry`]: subscriber lists, snapshot publish, failure isolation;
//! - [`builder`]: registry construction and the failure hook;
//! - [`config`]: data-only settings;
//! - [`guard`]: RAII subscriptions;
//! - [`handle`]: subscription identity;
//! - [`report`]: publish outcome;
//! - [`topic`]: topic keys.

mod builder;
mod config;
mod guard;
mod handle;
mod registry;
mod report;
mod topic;

pub use builder::{FailureHook, RegistryBuilder};
pub use config::Config;
pub use guard::SubscriptionGuard;
pub use handle::{SubscriptionHandle, SubscriptionId};
pub use registry::{Registry, WeakRegistry};
pub use report::{HandlerFailure, PublishReport};
pub use topic::{Topic, GLOBAL_TOPIC};
