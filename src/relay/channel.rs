//! # Relay: hot multicast channel for one delegate callback.
//!
//! A [`Relay`] fans every sent event out to all listeners attached at the
//! moment of sending. There is no replay: a listener attached after N sends
//! sees none of them.
//!
//! ## Architecture
//! ```text
//! send(event)              (snapshot of listeners, lock released)
//!     │
//!     ├──► inline listener 1 ──► f(&event)            (publishing thread)
//!     │                     └──► panic → ListenerPanicked
//!     ├──► [queue 2] ──► worker 2 ──► listener2.on_event()   (its runtime)
//!     │                         └──► panic → ListenerPanicked
//!     └──► [queue N] ──► EventStream::poll_next()
//! ```
//!
//! ## Rules
//! - **Subscription order**: listeners are visited in the order they subscribed.
//! - **Exactly once**: each listener gets each event once per `send`.
//! - **Concurrent send**: safe from any number of threads; the listener list
//!   is copy-on-write so `send` never holds the lock while running listeners.
//! - **Isolation**: a panicking listener does not stop delivery to the rest,
//!   and never unwinds into the caller of `send`.
//! - **Queues**: unbounded by default, so queued listeners see every event.
//!   With a limit ([`Config::queue_capacity`](crate::Config::queue_capacity),
//!   [`Listen::queue_capacity`] or [`Relay::bounded_stream`]) a full queue
//!   drops the event for that listener only and publishes `ListenerOverflow`.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::runtime::Handle;

use crate::core::Config;
use crate::error::RelayError;
use crate::events::{Bus, Event, EventKind};

use super::listen::Listen;
use super::queue::{self, QueueTx};
use super::stream::EventStream;
use super::subscription::{Detach, Subscription};

type InlineFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

enum Target<T> {
    Inline(InlineFn<T>),
    Queued(QueueTx<T>),
}

impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        match self {
            Target::Inline(f) => Target::Inline(Arc::clone(f)),
            Target::Queued(tx) => Target::Queued(tx.clone()),
        }
    }
}

/// One attached listener.
struct Sink<T> {
    id: u64,
    name: Arc<str>,
    target: Target<T>,
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            target: self.target.clone(),
        }
    }
}

struct Inner<T> {
    name: Arc<str>,
    bus: Option<Bus>,
    queue_limit: Option<usize>,
    next_id: AtomicU64,
    sinks: Mutex<Arc<Vec<Sink<T>>>>,
}

impl<T> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, Arc<Vec<Sink<T>>>> {
        // Listener code never runs under this lock, so poisoning cannot leave
        // the list half-updated.
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Arc<Vec<Sink<T>>> {
        Arc::clone(&self.lock())
    }

    fn report(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev);
        }
    }
}

impl<T: Send + 'static> Detach for Inner<T> {
    fn detach(&self, id: u64) {
        let removed = {
            let mut guard = self.lock();
            let Some(pos) = guard.iter().position(|s| s.id == id) else {
                return;
            };
            let mut next = Vec::clone(&guard);
            let sink = next.remove(pos);
            *guard = Arc::new(next);
            sink
        };
        self.report(
            Event::new(EventKind::ListenerRemoved)
                .with_relay(Arc::clone(&self.name))
                .with_listener(removed.name),
        );
    }

    fn contains(&self, id: u64) -> bool {
        self.lock().iter().any(|s| s.id == id)
    }
}

/// Multicast channel for the events of one delegate callback.
///
/// Cloning a `Relay` yields another handle to the same channel.
pub struct Relay<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Relay<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Relay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("name", &self.inner.name)
            .field("listeners", &self.inner.snapshot().len())
            .finish()
    }
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a relay without diagnostics and with unbounded queues.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::build(name.into(), None, None)
    }

    /// Creates a relay that reports listener diagnostics on `bus`.
    pub fn with_bus(name: impl Into<Arc<str>>, bus: &Bus) -> Self {
        Self::build(name.into(), Some(bus.clone()), None)
    }

    /// Creates a relay reporting on `bus` whose queued listeners default to
    /// [`Config::queue_limit`].
    pub fn with_config(name: impl Into<Arc<str>>, bus: &Bus, cfg: &Config) -> Self {
        Self::build(name.into(), Some(bus.clone()), cfg.queue_limit())
    }

    fn build(name: Arc<str>, bus: Option<Bus>, queue_limit: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                bus,
                queue_limit,
                next_id: AtomicU64::new(0),
                sinks: Mutex::new(Arc::new(Vec::new())),
            }),
        }
    }

    /// Relay name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of listeners currently attached.
    pub fn listener_count(&self) -> usize {
        self.inner.snapshot().len()
    }

    /// Publishes `event` to every attached listener.
    ///
    /// Inline listeners run before this returns, on the calling thread.
    /// Queued listeners are handed a clone and run on their own worker.
    pub fn send(&self, event: T) {
        let sinks = self.inner.snapshot();
        for sink in sinks.iter() {
            match &sink.target {
                Target::Inline(f) => {
                    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(&event))) {
                        self.inner.report(Event::listener_panicked(
                            &self.inner.name,
                            &sink.name,
                            panic_message(payload.as_ref()),
                        ));
                    }
                }
                Target::Queued(tx) => {
                    if let Err(rejected) = tx.push(event.clone()) {
                        self.inner.report(Event::listener_overflow(
                            &self.inner.name,
                            &sink.name,
                            rejected.as_reason(),
                        ));
                    }
                }
            }
        }
    }

    /// Attaches an inline listener, called synchronously on whichever
    /// thread sends.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_named("inline", f)
    }

    /// Same as [`subscribe`](Self::subscribe) with a name for diagnostics.
    pub fn subscribe_named<F>(&self, name: &str, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.attach(name.into(), Target::Inline(Arc::new(f)))
    }

    /// Attaches `listener` with delivery on `handle`'s runtime.
    ///
    /// Spawns one worker fed by its own queue. The queue limit is
    /// [`Listen::queue_capacity`], else the relay's default (unbounded unless
    /// configured). The worker exits once the subscription or the relay is
    /// dropped and its queue is drained.
    pub fn subscribe_on(&self, listener: Arc<dyn Listen<T>>, handle: &Handle) -> Subscription {
        let limit = listener.queue_capacity().or(self.inner.queue_limit);
        let name: Arc<str> = listener.name().into();
        let (tx, mut rx) = queue::channel::<T>(limit);

        let relay = Arc::clone(&self.inner.name);
        let bus = self.inner.bus.clone();
        handle.spawn(async move {
            while let Some(ev) = rx.recv().await {
                let fut = listener.on_event(&ev);
                if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
                    if let Some(bus) = &bus {
                        bus.publish(Event::listener_panicked(
                            &relay,
                            listener.name(),
                            panic_message(payload.as_ref()),
                        ));
                    }
                }
            }
        });

        self.attach(name, Target::Queued(tx))
    }

    /// Attaches `listener` with delivery on the current tokio runtime.
    ///
    /// # Errors
    /// [`RelayError::NoRuntime`] when called outside a runtime.
    pub fn subscribe_async(&self, listener: Arc<dyn Listen<T>>) -> Result<Subscription, RelayError> {
        let handle = Handle::try_current().map_err(|_| RelayError::NoRuntime {
            relay: self.name().to_string(),
        })?;
        Ok(self.subscribe_on(listener, &handle))
    }

    /// Returns a [`futures::Stream`] of future events using the relay's
    /// default queue limit. Dropping the stream unsubscribes.
    pub fn stream(&self) -> EventStream<T> {
        self.stream_with_limit(self.inner.queue_limit)
    }

    /// Like [`stream`](Self::stream) but buffers at most `capacity` (min 1)
    /// events; further events are dropped for this stream and reported as
    /// `ListenerOverflow`.
    pub fn bounded_stream(&self, capacity: usize) -> EventStream<T> {
        self.stream_with_limit(Some(capacity))
    }

    fn stream_with_limit(&self, limit: Option<usize>) -> EventStream<T> {
        let (tx, rx) = queue::channel::<T>(limit);
        let sub = self.attach("stream".into(), Target::Queued(tx));
        EventStream::new(rx, sub)
    }

    fn attach(&self, name: Arc<str>, target: Target<T>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut guard = self.inner.lock();
            let mut next = Vec::clone(&guard);
            next.push(Sink {
                id,
                name: Arc::clone(&name),
                target,
            });
            *guard = Arc::new(next);
        }
        self.inner.report(
            Event::new(EventKind::ListenerAdded)
                .with_relay(Arc::clone(&self.inner.name))
                .with_listener(name),
        );

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(weak, id)
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    fn counter(relay: &Relay<u32>) -> (Arc<AtomicUsize>, Subscription) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = relay.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        (hits, sub)
    }

    #[test]
    fn test_no_replay_for_late_listener() {
        let relay = Relay::<u32>::new("one");
        for i in 0..10 {
            relay.send(i);
        }
        let (hits, _sub) = counter(&relay);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        relay.send(10);
        relay.send(11);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fan_out_to_every_listener() {
        let relay = Relay::<u32>::new("one");
        for k in [0usize, 1, 7] {
            let subs: Vec<_> = (0..k).map(|_| counter(&relay)).collect();
            relay.send(1);
            relay.send(2);
            for (hits, _) in &subs {
                assert_eq!(hits.load(Ordering::SeqCst), 2);
            }
        }
    }

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let relay = Relay::<u32>::new("order");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let subs: Vec<_> = (0..4)
            .map(|i| {
                let seen = Arc::clone(&seen);
                relay.subscribe(move |_| seen.lock().unwrap().push(i))
            })
            .collect();

        relay.send(0);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
        drop(subs);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let relay = Relay::<u32>::new("one");
        let (hits, sub) = counter(&relay);
        assert!(sub.is_active());
        assert_eq!(relay.listener_count(), 1);

        sub.cancel();
        assert_eq!(relay.listener_count(), 0);
        relay.send(1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outliving_relay_is_inert() {
        let relay = Relay::<u32>::new("one");
        let (_hits, sub) = counter(&relay);
        drop(relay);
        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let bus = Bus::new(16);
        let mut diag = bus.subscribe();
        let relay = Relay::<u32>::with_bus("boom", &bus);

        let _bad = relay.subscribe_named("bad", |_| panic!("listener failure"));
        let (hits, _good) = counter(&relay);

        relay.send(1);
        relay.send(2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let mut panics = 0;
        while let Ok(ev) = diag.try_recv() {
            if ev.is_listener_panic() {
                assert_eq!(ev.listener.as_deref(), Some("bad"));
                assert_eq!(ev.reason.as_deref(), Some("listener failure"));
                panics += 1;
            }
        }
        assert_eq!(panics, 2);
    }

    #[test]
    fn test_concurrent_send_delivers_every_event() {
        let relay = Relay::<u32>::new("one");
        let (hits, _sub) = counter(&relay);

        std::thread::scope(|s| {
            for _ in 0..8 {
                let relay = relay.clone();
                s.spawn(move || {
                    for i in 0..125 {
                        relay.send(i);
                    }
                });
            }
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1000);
    }

    #[test]
    fn test_subscribe_async_without_runtime_fails() {
        struct Nop;
        #[async_trait]
        impl Listen<u32> for Nop {
            async fn on_event(&self, _: &u32) {}
        }

        let relay = Relay::<u32>::new("did_start");
        let err = relay.subscribe_async(Arc::new(Nop)).unwrap_err();
        assert_eq!(err.as_label(), "relay_no_runtime");
        assert_eq!(relay.listener_count(), 0);
    }

    struct Collect {
        seen: Arc<AtomicUsize>,
        panic_on: Option<u32>,
    }

    #[async_trait]
    impl Listen<u32> for Collect {
        async fn on_event(&self, ev: &u32) {
            if self.panic_on == Some(*ev) {
                panic!("bad event {ev}");
            }
            self.seen.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    async fn wait_for(counter: &AtomicUsize, expected: usize) {
        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queued_listener_survives_panic() {
        let bus = Bus::new(16);
        let mut diag = bus.subscribe();
        let relay = Relay::<u32>::with_bus("one", &bus);
        let seen = Arc::new(AtomicUsize::new(0));

        let _sub = relay
            .subscribe_async(Arc::new(Collect {
                seen: Arc::clone(&seen),
                panic_on: Some(2),
            }))
            .unwrap();

        for i in 1..=4 {
            relay.send(i);
        }
        wait_for(&seen, 3).await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        let mut panicked = false;
        while let Ok(ev) = diag.try_recv() {
            panicked |= ev.is_listener_panic();
        }
        assert!(panicked);
    }

    #[tokio::test]
    async fn test_default_stream_keeps_every_event() {
        let relay = Relay::<u32>::new("one");
        let mut stream = relay.stream();
        for i in 0..5000 {
            relay.send(i);
        }
        for i in 0..5000 {
            assert_eq!(stream.recv().await, Some(i));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_burst_reaches_queued_listener_intact() {
        let bus = Bus::new(16);
        let mut diag = bus.subscribe();
        let relay = Relay::<u32>::with_bus("one", &bus);
        let seen = Arc::new(AtomicUsize::new(0));
        let _sub = relay
            .subscribe_async(Arc::new(Collect {
                seen: Arc::clone(&seen),
                panic_on: None,
            }))
            .unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                let relay = relay.clone();
                s.spawn(move || {
                    for i in 0..1000 {
                        relay.send(i);
                    }
                });
            }
        });
        wait_for(&seen, 4000).await;
        assert_eq!(seen.load(Ordering::SeqCst), 4000);
        assert!(std::iter::from_fn(|| diag.try_recv().ok()).all(|ev| !ev.is_listener_overflow()));
    }

    #[test]
    fn test_configured_limit_bounds_streams() {
        let bus = Bus::new(16);
        let mut diag = bus.subscribe();
        let cfg = Config {
            queue_capacity: 2,
            ..Config::default()
        };
        let relay = Relay::<u32>::with_config("one", &bus, &cfg);
        let mut stream = relay.stream();
        for i in 0..3 {
            relay.send(i);
        }

        assert_eq!(stream.try_recv(), Some(0));
        assert_eq!(stream.try_recv(), Some(1));
        assert_eq!(stream.try_recv(), None);
        assert!(std::iter::from_fn(|| diag.try_recv().ok()).any(|ev| ev.is_listener_overflow()));
    }

    #[test]
    fn test_full_queue_reports_overflow() {
        let bus = Bus::new(16);
        let mut diag = bus.subscribe();
        let relay = Relay::<u32>::with_bus("one", &bus);

        let _stream = relay.bounded_stream(1);
        relay.send(1);
        relay.send(2);

        let overflow = std::iter::from_fn(|| diag.try_recv().ok())
            .find(|ev| ev.is_listener_overflow())
            .expect("overflow reported");
        assert_eq!(overflow.reason.as_deref(), Some("full"));
        assert_eq!(overflow.listener.as_deref(), Some("stream"));
    }
}
