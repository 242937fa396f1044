//! # Diagnostics bus.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from many sources (registry, proxies, relays).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Consumers (any):
//!   ProxyRegistry ──┐
//!   DelegateProxy ──┼──────► Bus ───────► LogWriter (feature "logging")
//!   Relay workers ──┘  (broadcast chan)    user receivers via Bus::subscribe()
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.
//!
//! Publishing is safe from a plain thread; no tokio runtime is required.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for diagnostic events.
///
/// Multiple publishers can publish concurrently; receivers get clones of each event.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// - Each call creates an **independent** receiver.
    /// - A receiver only gets events **sent after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(crate::Config::default().bus_capacity_clamped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_lost() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::ListenerAdded));

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_receiver_sees_only_later_events() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::ListenerAdded));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ListenerRemoved));

        let ev = rx.try_recv().expect("one event");
        assert_eq!(ev.kind, EventKind::ListenerRemoved);
        assert!(rx.try_recv().is_err());
    }
}
