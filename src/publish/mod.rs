//! The publisher behind `pushColors`.
//!
//! Publishing takes a snapshot of the registry and hands it to every
//! subscriber. It can be repeated freely; the most recent call wins.

mod sink;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use serde::{Deserialize, Serialize};

use crate::contract;
use crate::environment::{Binding, Environment};
use crate::error::{AngoraError, Result};
use crate::registry::PaletteRegistry;
use crate::types::Palette;

pub use sink::JsonFileSink;

/// One publish pass: the registry as it was when `push_colors` ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishEvent {
    /// Position of this event among the publisher's events, starting at 1.
    pub sequence: u64,
    /// Registry generation the snapshot was taken at.
    pub generation: u64,
    pub colors: Palette,
}

/// Receives published palettes.
pub trait Subscriber: Send + Sync {
    fn notify(&self, event: &PublishEvent) -> Result<()>;

    /// Label used in logs.
    fn label(&self) -> &str {
        "subscriber"
    }
}

impl<F> Subscriber for F
where
    F: Fn(&PublishEvent) + Send + Sync,
{
    fn notify(&self, event: &PublishEvent) -> Result<()> {
        self(event);
        Ok(())
    }
}

/// Handle to a shared publisher. Clones refer to the same publisher.
#[derive(Clone, Default)]
pub struct Publisher {
    inner: Arc<PublisherState>,
}

#[derive(Default)]
struct PublisherState {
    subscribers: Mutex<Vec<Arc<dyn Subscriber>>>,
    record: Mutex<Record>,
    /// Held for a whole delivery pass so passes never interleave.
    delivery: Mutex<()>,
    /// Thread currently running a delivery pass.
    delivering: Mutex<Option<ThreadId>>,
}

#[derive(Default)]
struct Record {
    sequence: u64,
    latest: Option<PublishEvent>,
}

/// Marks the current thread as delivering until dropped.
struct DeliveryPass<'a> {
    state: &'a PublisherState,
    _serial: MutexGuard<'a, ()>,
}

impl Drop for DeliveryPass<'_> {
    fn drop(&mut self) {
        *lock(&self.state.delivering) = None;
    }
}

impl Publisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the environment's publisher, binding a new one if absent.
    pub fn ensure_exists(env: &Environment) -> Result<Self> {
        let mut bindings = env.lock();
        let publisher = Self::from_binding(bindings.get(contract::PUSH_COLORS))?;
        bindings.insert(
            contract::PUSH_COLORS.to_string(),
            Binding::PushColors(publisher.clone()),
        );
        Ok(publisher)
    }

    /// The publisher that `pushColors` should hold, given its current
    /// binding. Nothing is bound here.
    pub(crate) fn from_binding(binding: Option<&Binding>) -> Result<Self> {
        match binding {
            Some(Binding::PushColors(publisher)) => Ok(publisher.clone()),
            Some(other) => Err(AngoraError::BindingConflict {
                name: contract::PUSH_COLORS.to_string(),
                message: format!("expected a publisher, found a {}", other.kind()),
            }),
            None => {
                tracing::debug!("created publisher");
                Ok(Publisher::new())
            }
        }
    }

    pub fn subscribe(&self, subscriber: impl Subscriber + 'static) {
        lock(&self.inner.subscribers).push(Arc::new(subscriber));
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    /// Snapshot `registry` and deliver it to every subscriber in order.
    ///
    /// A failing subscriber is logged and skipped; the rest still receive
    /// the event. An empty registry publishes an empty palette.
    ///
    /// Publishes from different threads run one at a time. A subscriber
    /// may publish again from inside `notify`: the nested event is recorded
    /// at once and the running pass switches to it, so no subscriber
    /// receives an older event after a newer one. A subscriber must not
    /// block on another thread that is publishing through the same
    /// publisher.
    pub fn push_colors(&self, registry: &PaletteRegistry) -> PublishEvent {
        let me = thread::current().id();
        if *lock(&self.inner.delivering) == Some(me) {
            let event = self.record(registry);
            tracing::debug!(sequence = event.sequence, "nested publish handed to running pass");
            return event;
        }

        let _pass = self.begin_pass(me);
        let event = self.record(registry);

        let mut current = event.clone();
        'pass: loop {
            // Release the list before calling out so subscribers may subscribe.
            let subscribers = lock(&self.inner.subscribers).clone();
            for subscriber in &subscribers {
                if let Err(err) = subscriber.notify(&current) {
                    tracing::warn!(
                        subscriber = subscriber.label(),
                        error = %err,
                        "subscriber failed to receive palette"
                    );
                }
                if let Some(newer) = self.newer_than(current.sequence) {
                    tracing::debug!(
                        stale = current.sequence,
                        sequence = newer.sequence,
                        "restarting delivery with newer palette"
                    );
                    current = newer;
                    continue 'pass;
                }
            }

            tracing::debug!(
                sequence = current.sequence,
                generation = current.generation,
                tokens = current.colors.len(),
                subscribers = subscribers.len(),
                "published palette"
            );
            break;
        }

        event
    }

    /// The most recent event, if anything has been published.
    pub fn latest(&self) -> Option<PublishEvent> {
        lock(&self.inner.record).latest.clone()
    }

    pub fn same_as(&self, other: &Publisher) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn begin_pass(&self, me: ThreadId) -> DeliveryPass<'_> {
        let serial = lock(&self.inner.delivery);
        *lock(&self.inner.delivering) = Some(me);
        DeliveryPass {
            state: &self.inner,
            _serial: serial,
        }
    }

    /// Take the snapshot and number it under one lock, so sequence order
    /// matches snapshot order.
    fn record(&self, registry: &PaletteRegistry) -> PublishEvent {
        let mut record = lock(&self.inner.record);
        let (generation, colors) = registry.versioned_snapshot();
        record.sequence += 1;
        let event = PublishEvent {
            sequence: record.sequence,
            generation,
            colors,
        };
        record.latest = Some(event.clone());
        event
    }

    fn newer_than(&self, sequence: u64) -> Option<PublishEvent> {
        let record = lock(&self.inner.record);
        record
            .latest
            .as_ref()
            .filter(|latest| latest.sequence > sequence)
            .cloned()
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.subscriber_count())
            .field("sequence", &lock(&self.inner.record).sequence)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Failing;

    impl Subscriber for Failing {
        fn notify(&self, _event: &PublishEvent) -> Result<()> {
            Err(AngoraError::Validation {
                message: "refused".to_string(),
                help: None,
            })
        }
    }

    fn setup() -> (PaletteRegistry, Publisher) {
        let env = Environment::new();
        (
            PaletteRegistry::ensure_exists(&env).unwrap(),
            Publisher::ensure_exists(&env).unwrap(),
        )
    }

    #[test]
    fn test_empty_publish_is_valid() {
        let (registry, publisher) = setup();
        let event = publisher.push_colors(&registry);

        assert!(event.colors.is_empty());
        assert_eq!(event.sequence, 1);
        assert_eq!(publisher.latest(), Some(event));
    }

    #[test]
    fn test_publish_reflects_latest_merge() {
        let (registry, publisher) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        publisher.subscribe(move |event: &PublishEvent| {
            sink.lock().unwrap().push(event.colors.get("x"));
        });

        registry.merge([("x", Colour::BLACK)]);
        publisher.push_colors(&registry);
        registry.merge([("x", Colour::WHITE)]);
        publisher.push_colors(&registry);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some(Colour::BLACK), Some(Colour::WHITE)]
        );
        assert_eq!(publisher.latest().unwrap().sequence, 2);
    }

    #[test]
    fn test_nested_publish_never_delivers_stale_event_last() {
        let (registry, publisher) = setup();
        registry.merge([("x", Colour::BLACK)]);

        let (inner_registry, inner_publisher) = (registry.clone(), publisher.clone());
        publisher.subscribe(move |event: &PublishEvent| {
            if event.sequence == 1 {
                inner_registry.merge([("x", Colour::WHITE)]);
                inner_publisher.push_colors(&inner_registry);
            }
        });

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        publisher.subscribe(move |event: &PublishEvent| {
            sink.lock().unwrap().push((event.sequence, event.colors.get("x")));
        });

        let first = publisher.push_colors(&registry);

        assert_eq!(first.sequence, 1);
        assert_eq!(*seen.lock().unwrap(), vec![(2, Some(Colour::WHITE))]);
        assert_eq!(publisher.latest().unwrap().sequence, 2);
    }

    #[test]
    fn test_concurrent_publishes_end_on_newest_snapshot() {
        let (registry, publisher) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        publisher.subscribe(move |event: &PublishEvent| {
            sink.lock().unwrap().push((event.sequence, event.generation));
        });

        std::thread::scope(|scope| {
            for t in 0..8u8 {
                let (registry, publisher) = (&registry, &publisher);
                scope.spawn(move || {
                    for i in 0..25u8 {
                        registry.merge([(format!("t{t}"), Colour::rgb(t, i, 0))]);
                        publisher.push_colors(registry);
                    }
                });
            }
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 200);
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 <= w[1].1));

        let latest = publisher.latest().unwrap();
        assert_eq!(seen.last(), Some(&(latest.sequence, latest.generation)));
        assert_eq!(latest.generation, registry.generation());
        assert_eq!(latest.colors, registry.snapshot());
    }

    #[test]
    fn test_failing_subscriber_does_not_stop_broadcast() {
        let (registry, publisher) = setup();
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);

        publisher.subscribe(Failing);
        publisher.subscribe(move |_: &PublishEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        publisher.push_colors(&registry);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ensure_exists_reuses_binding() {
        let env = Environment::new();
        let a = Publisher::ensure_exists(&env).unwrap();
        let b = Publisher::ensure_exists(&env).unwrap();
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_plain_value_under_push_colors_is_conflict() {
        let env = Environment::new();
        env.define("pushColors", json!("nope")).unwrap();
        assert!(matches!(
            Publisher::ensure_exists(&env),
            Err(AngoraError::BindingConflict { .. })
        ));
    }

    #[test]
    fn test_event_serializes_colors_as_hex() {
        let (registry, publisher) = setup();
        registry.merge([("primary", Colour::rgb(0x11, 0x11, 0x11))]);
        let event = publisher.push_colors(&registry);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"sequence": 1, "generation": 1, "colors": {"primary": "#111111"}})
        );
    }
}
