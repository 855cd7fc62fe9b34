//! # Topic keys.
//!
//! A [`Topic`] partitions subscribers into independent notification groups.
//! It is a thin `Arc<str>` newtype: cloning is a refcount bump, so topics can be
//! carried by handles, reports and diagnostic events without copying.
//!
//! Code that only needs one channel can use [`Topic::global`].

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of the implicit topic used by single-channel registries.
pub const GLOBAL_TOPIC: &str = "global";

/// Notification channel key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Arc<str>);

impl Topic {
    /// Creates a topic from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The implicit single topic ([`GLOBAL_TOPIC`]).
    pub fn global() -> Self {
        Self::new(GLOBAL_TOPIC)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub(crate) fn as_arc(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// `Arc<str>` hashes like `str`, so map lookups by `&str` are sound.
impl Borrow<str> for Topic {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for Topic {
    fn from(s: &String) -> Self {
        Self::new(s.as_str())
    }
}

impl From<Arc<str>> for Topic {
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

impl From<&Topic> for Topic {
    fn from(t: &Topic) -> Self {
        t.clone()
    }
}
