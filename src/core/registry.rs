//! # Topic registry - subscribe, unsubscribe, publish.
//!
//! [`Registry`] owns an ordered list of subscribers per [`Topic`] and delivers
//! payloads to them synchronously.
//!
//! ## Architecture
//! ```text
//! subscribe(topic, sub) ──► lock ──► topics[topic].push(entry) ──► unlock ──► Subscribed
//! unsubscribe(handle)   ──► lock ──► remove entry by id        ──► unlock ──► Unsubscribed
//!
//! publish(topic, &p)
//!   ├─► lock ──► clone topics[topic] (snapshot) ──► unlock
//!   ├─► for entry in snapshot: entry.on_event(&p)   (no lock held)
//!   │        └─ Err / panic → HandlerFailure (delivery continues)
//!   └─► after the pass: log failures, call failure hook, emit events
//! ```
//!
//! ## Rules
//! - One mutex guards the topic map; handlers always run with it released.
//! - A publish pass delivers to exactly the entries present when it started.
//!   Subscribing or unsubscribing from inside a handler affects later passes only.
//! - Insertion order is delivery order within one pass.
//! - A topic list is created on first subscribe and dropped when it becomes empty.
//! - Unknown handles and empty topics are no-ops, never errors.
//! - Clones share state; there is no global instance.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::builder::{FailureHook, RegistryBuilder};
use super::config::Config;
use super::guard::SubscriptionGuard;
use super::handle::{SubscriptionHandle, SubscriptionId};
use super::report::{HandlerFailure, PublishReport};
use super::topic::Topic;
use crate::error::{HandlerError, PublishError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{SubscriberFn, SubscriberRef};

/// One registration.
struct Entry<P: ?Sized> {
    id: SubscriptionId,
    subscriber: SubscriberRef<P>,
}

impl<P: ?Sized> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            subscriber: Arc::clone(&self.subscriber),
        }
    }
}

type TopicMap<P> = HashMap<Topic, Vec<Entry<P>>>;

/// State shared by all clones of a registry.
struct Shared<P: ?Sized> {
    topics: Mutex<TopicMap<P>>,
    cfg: Config,
    bus: Bus,
    on_failure: Option<FailureHook>,
}

/// In-process publish/notify registry for payloads of type `P`.
///
/// Cheap to clone (`Arc` inside); all clones see the same subscribers.
pub struct Registry<P: ?Sized> {
    shared: Arc<Shared<P>>,
}

/// Non-owning reference to a [`Registry`].
///
/// Handlers that need to call back into their own registry (for example to
/// unsubscribe themselves) should capture one of these to avoid a reference cycle.
pub struct WeakRegistry<P: ?Sized> {
    shared: Weak<Shared<P>>,
}

impl<P: ?Sized + 'static> Registry<P> {
    /// Creates an empty registry with [`Config::default`].
    pub fn new() -> Self {
        RegistryBuilder::new(Config::default()).build()
    }

    /// Starts a builder with the given configuration.
    pub fn builder(cfg: Config) -> RegistryBuilder<P> {
        RegistryBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: Config, on_failure: Option<FailureHook>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            shared: Arc::new(Shared {
                topics: Mutex::new(HashMap::new()),
                cfg,
                bus,
                on_failure,
            }),
        }
    }

    /// Appends `subscriber` to the topic's list and returns its handle.
    ///
    /// Creates the topic on first use. Registering the same subscriber again
    /// creates a second, independent entry.
    pub fn subscribe(
        &self,
        topic: impl Into<Topic>,
        subscriber: SubscriberRef<P>,
    ) -> SubscriptionHandle {
        self.shared.insert(topic.into(), subscriber)
    }

    /// Registers a named closure.
    ///
    /// # Example
    /// ```
    /// use notifyhub::Registry;
    ///
    /// let registry: Registry<u32> = Registry::new();
    /// let handle = registry.subscribe_fn("ticks", "printer", |n| {
    ///     println!("tick {n}");
    ///     Ok(())
    /// });
    ///
    /// assert!(registry.publish("ticks", &1).is_ok());
    /// assert!(registry.unsubscribe(&handle));
    /// ```
    pub fn subscribe_fn<F>(
        &self,
        topic: impl Into<Topic>,
        name: &'static str,
        f: F,
    ) -> SubscriptionHandle
    where
        F: Fn(&P) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe(topic, SubscriberFn::arc(name, f))
    }

    /// Registers `subscriber` and returns a guard that unsubscribes it on drop.
    pub fn subscribe_scoped(
        &self,
        topic: impl Into<Topic>,
        subscriber: SubscriberRef<P>,
    ) -> SubscriptionGuard<P> {
        let handle = self.subscribe(topic, subscriber);
        SubscriptionGuard::new(handle, self.downgrade())
    }

    /// Removes exactly the entry created for `handle`.
    ///
    /// Returns `false` (and does nothing) if the entry is already gone.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.shared.remove(handle)
    }

    /// Removes every subscriber of `topic`; returns how many were removed.
    pub fn clear_topic(&self, topic: impl AsRef<str>) -> usize {
        self.shared.clear(topic.as_ref())
    }

    /// Delivers `payload` to every subscriber registered on `topic` when the call starts.
    ///
    /// Handlers run in registration order on the calling thread. A failing or
    /// panicking handler does not stop the pass; failures are returned in the
    /// report (and logged / passed to the failure hook, per configuration).
    pub fn publish(&self, topic: impl Into<Topic>, payload: &P) -> PublishReport {
        let topic = topic.into();
        let snapshot = self.shared.snapshot(&topic);
        self.shared.deliver(topic, snapshot, payload)
    }

    /// Number of subscribers currently registered on `topic`.
    pub fn subscriber_count(&self, topic: impl AsRef<str>) -> usize {
        self.shared
            .lock()
            .get(topic.as_ref())
            .map_or(0, Vec::len)
    }

    pub fn has_subscribers(&self, topic: impl AsRef<str>) -> bool {
        self.subscriber_count(topic) > 0
    }

    /// Number of registrations across all topics.
    pub fn total_subscribers(&self) -> usize {
        self.shared.lock().values().map(Vec::len).sum()
    }

    /// Returns a sorted list of topics that have at least one subscriber.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.shared.lock().keys().cloned().collect();
        topics.sort_unstable();
        topics
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().is_empty()
    }

    /// Creates a receiver for the registry's diagnostic events.
    ///
    /// The receiver only observes events emitted after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    pub fn config(&self) -> &Config {
        &self.shared.cfg
    }

    /// Creates a non-owning reference to this registry.
    pub fn downgrade(&self) -> WeakRegistry<P> {
        WeakRegistry {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl<P: Send + Sync + 'static> Registry<P> {
    /// Delivers `payload` on the tokio blocking pool.
    ///
    /// The snapshot is taken before this method returns, so the pass sees the
    /// same subscribers a synchronous `publish` at this point would.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn publish_detached(
        &self,
        topic: impl Into<Topic>,
        payload: P,
    ) -> JoinHandle<PublishReport> {
        let topic = topic.into();
        let snapshot = self.shared.snapshot(&topic);
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || shared.deliver(topic, snapshot, &payload))
    }

    /// Awaits a [`publish_detached`](Self::publish_detached) pass.
    ///
    /// A pass that could not complete (e.g. an uncaught handler panic with
    /// `catch_panics = false`) is reported as [`PublishError::Join`].
    pub async fn publish_async(
        &self,
        topic: impl Into<Topic>,
        payload: P,
    ) -> Result<PublishReport, PublishError> {
        self.publish_detached(topic, payload)
            .await
            .map_err(|e| PublishError::Join {
                reason: e.to_string(),
            })
    }
}

impl<P: ?Sized + 'static> Shared<P> {
    fn lock(&self) -> MutexGuard<'_, TopicMap<P>> {
        // Handlers never run under this lock, so a poisoned map is still consistent.
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self, topic: &Topic) -> Vec<Entry<P>> {
        self.lock()
            .get(topic.as_str())
            .cloned()
            .unwrap_or_default()
    }

    // Membership events are built under the lock so their `seq` follows mutation order.
    // They are sent after it is released; receivers may see them slightly out of order.

    fn insert(&self, topic: Topic, subscriber: SubscriberRef<P>) -> SubscriptionHandle {
        let id = SubscriptionId::next();
        let name: Arc<str> = subscriber.name().into();

        let (created, subscribed) = {
            let mut topics = self.lock();
            let list = topics.entry(topic.clone()).or_default();
            let created = list
                .is_empty()
                .then(|| Event::new(EventKind::TopicCreated).with_topic(topic.as_arc()));
            list.push(Entry { id, subscriber });
            let subscribed = Event::new(EventKind::Subscribed)
                .with_topic(topic.as_arc())
                .with_subscriber(Arc::clone(&name))
                .with_subscription(id);
            (created, subscribed)
        };

        tracing::debug!(topic = %topic, subscriber = %name, subscription = %id, "subscribed");
        if let Some(ev) = created {
            self.bus.publish(ev);
        }
        self.bus.publish(subscribed);

        SubscriptionHandle::new(id, topic)
    }

    fn remove(&self, handle: &SubscriptionHandle) -> bool {
        let topic = handle.topic();
        let (name, unsubscribed, dropped) = {
            let mut topics = self.lock();
            let Some(list) = topics.get_mut(topic.as_str()) else {
                return false;
            };
            let Some(pos) = list.iter().position(|e| e.id == handle.id()) else {
                return false;
            };
            let entry = list.remove(pos);
            let name: Arc<str> = entry.subscriber.name().into();
            let unsubscribed = Event::new(EventKind::Unsubscribed)
                .with_topic(topic.as_arc())
                .with_subscriber(Arc::clone(&name))
                .with_subscription(entry.id);
            let dropped = list.is_empty().then(|| {
                topics.remove(topic.as_str());
                Event::new(EventKind::TopicDropped).with_topic(topic.as_arc())
            });
            (name, unsubscribed, dropped)
        };

        tracing::debug!(
            topic = %topic,
            subscriber = %name,
            subscription = %handle.id(),
            "unsubscribed"
        );
        self.bus.publish(unsubscribed);
        if let Some(ev) = dropped {
            tracing::debug!(topic = %topic, "topic dropped");
            self.bus.publish(ev);
        }
        true
    }

    fn clear(&self, topic: &str) -> usize {
        let (topic, events) = {
            let mut topics = self.lock();
            let Some((topic, list)) = topics.remove_entry(topic) else {
                return 0;
            };
            let mut events: Vec<Event> = list
                .iter()
                .map(|entry| {
                    Event::new(EventKind::Unsubscribed)
                        .with_topic(topic.as_arc())
                        .with_subscriber(entry.subscriber.name())
                        .with_subscription(entry.id)
                })
                .collect();
            events.push(Event::new(EventKind::TopicDropped).with_topic(topic.as_arc()));
            (topic, events)
        };

        let removed = events.len() - 1;
        tracing::debug!(topic = %topic, removed, "topic cleared");
        for ev in events {
            self.bus.publish(ev);
        }
        removed
    }

    fn deliver(&self, topic: Topic, snapshot: Vec<Entry<P>>, payload: &P) -> PublishReport {
        if snapshot.is_empty() {
            tracing::trace!(topic = %topic, "publish to empty topic");
            return PublishReport::empty(topic);
        }

        let mut failures = Vec::new();
        for entry in &snapshot {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| entry.subscriber.on_event(payload)));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error,
                Err(panic_err) if self.cfg.catch_panics => HandlerError::Panicked {
                    info: panic_message(panic_err.as_ref()),
                },
                Err(panic_err) => {
                    // Failures seen before the panic are still reported.
                    self.report_failures(&topic, &failures);
                    panic::resume_unwind(panic_err);
                }
            };
            failures.push(HandlerFailure {
                subscription: entry.id,
                subscriber: entry.subscriber.name().into(),
                error,
            });
        }

        self.report_failures(&topic, &failures);

        tracing::trace!(
            topic = %topic,
            delivered = snapshot.len(),
            failed = failures.len(),
            "published"
        );
        if self.bus.has_receivers() {
            self.bus.publish(
                Event::new(EventKind::Published)
                    .with_topic(topic.as_arc())
                    .with_counts(snapshot.len(), failures.len()),
            );
        }

        PublishReport {
            topic,
            delivered: snapshot.len(),
            failures,
        }
    }

    fn report_failures(&self, topic: &Topic, failures: &[HandlerFailure]) {
        for failure in failures {
            if self.cfg.log_failures {
                tracing::warn!(
                    topic = %topic,
                    subscriber = %failure.subscriber,
                    subscription = %failure.subscription,
                    label = failure.error.as_label(),
                    "{}",
                    failure.error.as_message()
                );
            }
            if let Some(hook) = &self.on_failure {
                hook(topic, failure);
            }
            self.bus
                .publish(Event::handler_failure(topic.as_arc(), failure));
        }
    }
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<P: ?Sized> Clone for Registry<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P: ?Sized + 'static> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + 'static> fmt::Debug for Registry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("topics", &self.topics())
            .field("subscribers", &self.total_subscribers())
            .field("config", &self.shared.cfg)
            .finish()
    }
}

impl<P: ?Sized> WeakRegistry<P> {
    /// Returns the registry if at least one strong handle is still alive.
    pub fn upgrade(&self) -> Option<Registry<P>> {
        self.shared.upgrade().map(|shared| Registry { shared })
    }
}

impl<P: ?Sized> Clone for WeakRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<P: ?Sized> fmt::Debug for WeakRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRegistry")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::Recorder;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::OnceLock;
    use std::thread;

    fn labelled(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> SubscriberRef<String> {
        let log = Arc::clone(log);
        SubscriberFn::arc(label, move |_: &String| {
            log.lock().unwrap().push(label);
            Ok::<_, HandlerError>(())
        })
    }

    #[test]
    fn test_publish_in_order_then_unsubscribe() {
        let registry: Registry<String> = Registry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let h1 = registry.subscribe("t", labelled(&log, "H1"));
        let _h2 = registry.subscribe("t", labelled(&log, "H2"));

        let report = registry.publish("t", &"X".to_string());
        assert!(report.is_ok());
        assert_eq!(report.delivered, 2);
        assert_eq!(*log.lock().unwrap(), vec!["H1", "H2"]);

        assert!(registry.unsubscribe(&h1));
        log.lock().unwrap().clear();
        let report = registry.publish("t", &"Y".to_string());
        assert_eq!(report.delivered, 1);
        assert_eq!(*log.lock().unwrap(), vec!["H2"]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let registry: Registry<u32> = Registry::new();
        let h = registry.subscribe_fn("t", "noop", |_| Ok(()));
        assert!(registry.unsubscribe(&h));
        assert!(!registry.unsubscribe(&h));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_registration_is_independent() {
        let registry: Registry<u32> = Registry::new();
        let rec = Arc::new(Recorder::<u32>::new());
        let a = registry.subscribe("t", rec.clone());
        let b = registry.subscribe("t", rec.clone());
        assert_ne!(a, b);
        assert_eq!(registry.subscriber_count("t"), 2);

        let _ = registry.publish("t", &1);
        assert_eq!(rec.snapshot(), vec![1, 1]);

        assert!(registry.unsubscribe(&a));
        let _ = registry.publish("t", &2);
        assert_eq!(rec.snapshot(), vec![1, 1, 2]);

        assert!(registry.unsubscribe(&b));
        let _ = registry.publish("t", &3);
        assert_eq!(rec.snapshot(), vec![1, 1, 2]);
    }

    #[test]
    fn test_self_unsubscribe_keeps_current_delivery() {
        let registry: Registry<String> = Registry::new();
        let weak = registry.downgrade();
        let me: Arc<OnceLock<SubscriptionHandle>> = Arc::new(OnceLock::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let handle = {
            let (me, hits) = (Arc::clone(&me), Arc::clone(&hits));
            registry.subscribe_fn("t", "one-shot", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
                if let (Some(registry), Some(handle)) = (weak.upgrade(), me.get()) {
                    registry.unsubscribe(handle);
                }
                Ok(())
            })
        };
        me.set(handle).expect("set once");
        let other = Arc::new(Recorder::<String>::new());
        registry.subscribe("t", other.clone());

        let report = registry.publish("t", &"first".to_string());
        assert_eq!(report.delivered, 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let report = registry.publish("t", &"second".to_string());
        assert_eq!(report.delivered, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(other.snapshot(), vec!["first", "second"]);
    }

    #[test]
    fn test_subscribe_during_publish_waits_for_next_pass() {
        let registry: Registry<u32> = Registry::new();
        let late = Arc::new(Recorder::<u32>::new());

        {
            let weak = registry.downgrade();
            let late = late.clone();
            let added = Arc::new(AtomicUsize::new(0));
            registry.subscribe_fn("t", "spawner", move |_| {
                if added.fetch_add(1, Ordering::SeqCst) == 0 {
                    if let Some(registry) = weak.upgrade() {
                        registry.subscribe("t", late.clone());
                    }
                }
                Ok(())
            });
        }

        assert_eq!(registry.publish("t", &1).delivered, 1);
        assert!(late.is_empty());

        assert_eq!(registry.publish("t", &2).delivered, 2);
        assert_eq!(late.snapshot(), vec![2]);
    }

    #[test]
    fn test_nested_publish_does_not_deadlock() {
        let registry: Registry<u32> = Registry::new();
        let downstream = Arc::new(Recorder::<u32>::new());
        registry.subscribe("out", downstream.clone());

        let weak = registry.downgrade();
        registry.subscribe_fn("in", "relay", move |n| {
            if let Some(registry) = weak.upgrade() {
                registry
                    .publish("out", &(n * 10))
                    .into_result()
                    .map_err(|e| HandlerError::fail(e.to_string()))?;
            }
            Ok(())
        });

        assert!(registry.publish("in", &4).is_ok());
        assert_eq!(downstream.snapshot(), vec![40]);
    }

    #[test]
    fn test_failing_handler_is_isolated() {
        let seen: Arc<Mutex<Vec<HandlerFailure>>> = Arc::new(Mutex::new(Vec::new()));
        let hook_seen = Arc::clone(&seen);
        let registry: Registry<u32> = Registry::builder(Config::default())
            .with_failure_hook(move |_topic, failure| {
                hook_seen.lock().unwrap().push(failure.clone());
            })
            .build();

        let a = Arc::new(Recorder::<u32>::new().with_label("A"));
        let c = Arc::new(Recorder::<u32>::new().with_label("C"));
        registry.subscribe("t", a.clone());
        let b = registry.subscribe_fn("t", "B", |_| Err(HandlerError::fail("broken")));
        registry.subscribe("t", c.clone());

        let report = registry.publish("t", &9);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(a.snapshot(), vec![9]);
        assert_eq!(c.snapshot(), vec![9]);

        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.subscription, b.id());
        assert_eq!(&*failure.subscriber, "B");
        assert_eq!(failure.error, HandlerError::fail("broken"));
        assert_eq!(*seen.lock().unwrap(), report.failures);

        assert!(matches!(
            report.into_result(),
            Err(PublishError::HandlersFailed { attempted: 3, .. })
        ));
    }

    #[test]
    fn test_panicking_handler_is_caught() {
        let registry: Registry<u32> = Registry::new();
        registry.subscribe_fn("t", "panicker", |_| panic!("sensor exploded"));
        let after = Arc::new(Recorder::<u32>::new());
        registry.subscribe("t", after.clone());

        let report = registry.publish("t", &1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            HandlerError::Panicked {
                info: "sensor exploded".into()
            }
        );
        assert_eq!(after.snapshot(), vec![1]);
    }

    #[test]
    #[should_panic(expected = "sensor exploded")]
    fn test_panics_propagate_when_not_caught() {
        let cfg = Config {
            catch_panics: false,
            ..Config::default()
        };
        let registry: Registry<u32> = Registry::builder(cfg).build();
        registry.subscribe_fn("t", "panicker", |_| panic!("sensor exploded"));
        let _ = registry.publish("t", &1);
    }

    #[test]
    fn test_failures_before_uncaught_panic_are_reported() {
        let cfg = Config {
            catch_panics: false,
            ..Config::default()
        };
        let seen: Arc<Mutex<Vec<Arc<str>>>> = Arc::new(Mutex::new(Vec::new()));
        let hook_seen = Arc::clone(&seen);
        let registry: Registry<u32> = Registry::builder(cfg)
            .with_failure_hook(move |_topic, failure| {
                hook_seen.lock().unwrap().push(Arc::clone(&failure.subscriber));
            })
            .build();
        let mut rx = registry.events();

        registry.subscribe_fn("t", "bad", |_| Err(HandlerError::fail("nope")));
        registry.subscribe_fn("t", "panicker", |_| panic!("sensor exploded"));
        let never = Arc::new(Recorder::<u32>::new());
        registry.subscribe("t", never.clone());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| registry.publish("t", &1)));
        assert!(outcome.is_err());
        assert_eq!(*seen.lock().unwrap(), vec![Arc::<str>::from("bad")]);
        assert!(never.is_empty());

        let mut failed = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::HandlerFailed {
                failed += 1;
            }
        }
        assert_eq!(failed, 1);
    }

    #[test]
    fn test_concurrent_mutation_and_publish() {
        let registry: Registry<u32> = Registry::new();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        let h = registry.subscribe_fn("shared", "worker", |_| Ok(()));
                        let report = registry.publish("shared", &i);
                        assert!(report.delivered >= 1);
                        assert!(report.is_ok());
                        assert!(registry.unsubscribe(&h));
                        assert!(!registry.unsubscribe(&h));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().expect("worker thread");
        }

        assert!(registry.is_empty());
        assert_eq!(registry.total_subscribers(), 0);
        assert_eq!(registry.publish("shared", &0).delivered, 0);
    }

    #[test]
    fn test_membership_event_seq_follows_mutation_order() {
        let registry: Registry<u32> = Registry::builder(Config {
            bus_capacity: 4096,
            ..Config::default()
        })
        .build();
        let mut rx = registry.events();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let h = registry.subscribe_fn("t", "worker", |_| Ok(()));
                        registry.unsubscribe(&h);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().expect("worker thread");
        }

        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events.sort_by_key(|ev| ev.seq);
        let created = events
            .iter()
            .filter(|ev| ev.kind == EventKind::TopicCreated)
            .count();
        assert!(created >= 1);
        assert_eq!(events.len(), 4 * 100 * 2 + 2 * created);

        let (mut open, mut live) = (false, 0usize);
        for ev in &events {
            match ev.kind {
                EventKind::TopicCreated => {
                    assert!(!open && live == 0);
                    open = true;
                }
                EventKind::Subscribed => {
                    assert!(open);
                    live += 1;
                }
                EventKind::Unsubscribed => {
                    assert!(open && live > 0);
                    live -= 1;
                }
                EventKind::TopicDropped => {
                    assert!(open && live == 0);
                    open = false;
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert!(!open);
    }

    #[test]
    fn test_empty_topic_is_noop() {
        let registry: Registry<u32> = Registry::new();
        let mut rx = registry.events();
        let report = registry.publish("nobody", &1);
        assert_eq!(report.delivered, 0);
        assert!(report.is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_topic_lifecycle_and_queries() {
        let registry: Registry<u32> = Registry::new();
        let a = registry.subscribe_fn("b-topic", "x", |_| Ok(()));
        registry.subscribe_fn("a-topic", "y", |_| Ok(()));
        registry.subscribe_fn("a-topic", "z", |_| Ok(()));

        assert_eq!(
            registry.topics(),
            vec![Topic::from("a-topic"), Topic::from("b-topic")]
        );
        assert_eq!(registry.total_subscribers(), 3);
        assert!(registry.has_subscribers("b-topic"));

        registry.unsubscribe(&a);
        assert!(!registry.has_subscribers("b-topic"));
        assert_eq!(registry.topics(), vec![Topic::from("a-topic")]);

        assert_eq!(registry.clear_topic("a-topic"), 2);
        assert_eq!(registry.clear_topic("a-topic"), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let registry: Registry<u32> = Registry::new();
        let clone = registry.clone();
        let h = clone.subscribe_fn("t", "x", |_| Ok(()));
        assert_eq!(registry.subscriber_count("t"), 1);
        assert!(registry.unsubscribe(&h));
        assert_eq!(clone.subscriber_count("t"), 0);
    }

    #[test]
    fn test_independent_registries_do_not_share_handles() {
        let first: Registry<u32> = Registry::new();
        let second: Registry<u32> = Registry::new();
        let h = first.subscribe_fn("t", "x", |_| Ok(()));
        second.subscribe_fn("t", "y", |_| Ok(()));
        assert!(!second.unsubscribe(&h));
        assert_eq!(second.subscriber_count("t"), 1);
    }

    #[test]
    fn test_weak_registry_upgrade() {
        let registry: Registry<u32> = Registry::new();
        let weak = registry.downgrade();
        assert!(weak.upgrade().is_some());
        drop(registry);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_diagnostic_events_sequence() {
        let registry: Registry<u32> = Registry::new();
        let mut rx = registry.events();

        let h = registry.subscribe_fn("t", "bad", |_| Err(HandlerError::fail("nope")));
        let _ = registry.publish("t", &1);
        registry.unsubscribe(&h);

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::TopicCreated,
                EventKind::Subscribed,
                EventKind::HandlerFailed,
                EventKind::Published,
                EventKind::Unsubscribed,
                EventKind::TopicDropped,
            ]
        );
    }

    #[tokio::test]
    async fn test_detached_publish_uses_call_time_snapshot() {
        let registry: Registry<u32> = Registry::new();
        let early = Arc::new(Recorder::<u32>::new());
        let late = Arc::new(Recorder::<u32>::new());
        let h = registry.subscribe("t", early.clone());

        let join = registry.publish_detached("t", 5);
        registry.unsubscribe(&h);
        registry.subscribe("t", late.clone());

        let report = join.await.expect("join");
        assert_eq!(report.delivered, 1);
        assert_eq!(early.snapshot(), vec![5]);
        assert!(late.is_empty());
    }

    #[tokio::test]
    async fn test_publish_async_reports_failures() {
        let registry: Registry<u32> = Registry::new();
        registry.subscribe_fn("t", "bad", |_| Err(HandlerError::fail("nope")));
        let report = registry.publish_async("t", 1).await.expect("joined");
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_async_uncaught_panic_is_join_error() {
        let cfg = Config {
            catch_panics: false,
            ..Config::default()
        };
        let registry: Registry<u32> = Registry::builder(cfg).build();
        registry.subscribe_fn("t", "panicker", |_| panic!("gone"));
        let err = registry.publish_async("t", 1).await.unwrap_err();
        assert_eq!(err.as_label(), "publish_join_failed");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Subscribe(u8),
        Unsubscribe(usize),
        Publish(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..3).prop_map(Op::Subscribe),
            any::<usize>().prop_map(Op::Unsubscribe),
            (0u8..3).prop_map(Op::Publish),
        ]
    }

    struct Live {
        label: usize,
        topic: u8,
        handle: SubscriptionHandle,
        alive: bool,
    }

    proptest! {
        #[test]
        fn prop_publish_reaches_exactly_live_subscribers(
            ops in prop::collection::vec(op_strategy(), 1..64)
        ) {
            let registry: Registry<u32> = Registry::new();
            let log: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
            let mut model: Vec<Live> = Vec::new();

            for op in ops {
                match op {
                    Op::Subscribe(topic) => {
                        let label = model.len();
                        let log = Arc::clone(&log);
                        let handle = registry.subscribe_fn(format!("t{topic}"), "probe", move |_| {
                            log.lock().unwrap().push(label);
                            Ok(())
                        });
                        model.push(Live { label, topic, handle, alive: true });
                    }
                    Op::Unsubscribe(i) => {
                        if model.is_empty() {
                            continue;
                        }
                        let idx = i % model.len();
                        let live = &mut model[idx];
                        prop_assert_eq!(registry.unsubscribe(&live.handle), live.alive);
                        live.alive = false;
                    }
                    Op::Publish(topic) => {
                        log.lock().unwrap().clear();
                        let report = registry.publish(format!("t{topic}"), &0);
                        let expected: Vec<usize> = model
                            .iter()
                            .filter(|m| m.topic == topic && m.alive)
                            .map(|m| m.label)
                            .collect();
                        prop_assert_eq!(report.delivered, expected.len());
                        prop_assert_eq!(log.lock().unwrap().clone(), expected);
                    }
                }
            }
        }
    }
}
