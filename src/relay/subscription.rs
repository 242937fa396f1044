//! # Subscription handles.
//!
//! Every listener attached to a [`Relay`](crate::Relay) is represented by a
//! [`Subscription`]. Dropping the handle (or calling [`Subscription::cancel`])
//! removes the listener; nothing else keeps it attached.
//!
//! Disposal stops **future** deliveries only. A delivery already running on
//! another thread, or already sitting in a listener's queue, is not aborted.
//!
//! [`Subscriptions`] is a bag for keeping many handles alive together, e.g.
//! for the lifetime of a view or a session.

use std::fmt;
use std::sync::Weak;

/// Removal side of a relay, erased over the event type.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: u64);
    fn contains(&self, id: u64) -> bool;
}

/// Handle to one listener on one relay. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    relay: Option<Weak<dyn Detach>>,
    id: u64,
}

impl Subscription {
    pub(crate) fn new(relay: Weak<dyn Detach>, id: u64) -> Self {
        Self {
            relay: Some(relay),
            id,
        }
    }

    /// Unsubscribes now. Same as dropping the handle.
    pub fn cancel(self) {}

    /// True while the listener is still attached to a live relay.
    pub fn is_active(&self) -> bool {
        self.relay
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|relay| relay.contains(self.id))
    }

    /// Moves this handle into `bag`, tying its lifetime to the bag's.
    pub fn store_in(self, bag: &mut Subscriptions) {
        bag.insert(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.take().and_then(|w| w.upgrade()) {
            relay.detach(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// A set of subscriptions dropped together.
#[derive(Debug, Default)]
pub struct Subscriptions {
    items: Vec<Subscription>,
}

impl Subscriptions {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription to the bag.
    pub fn insert(&mut self, sub: Subscription) {
        self.items.push(sub);
    }

    /// Unsubscribes everything in the bag.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of handles held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the bag holds no handles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Extend<Subscription> for Subscriptions {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Relay;

    #[test]
    fn test_bag_clear_detaches_all() {
        let relay = Relay::<u32>::new("one");
        let mut bag = Subscriptions::new();
        bag.extend((0..3).map(|_| relay.subscribe(|_| {})));
        relay.subscribe(|_| {}).store_in(&mut bag);
        assert_eq!(bag.len(), 4);
        assert_eq!(relay.listener_count(), 4);

        bag.clear();
        assert!(bag.is_empty());
        assert_eq!(relay.listener_count(), 0);
    }

    #[test]
    fn test_cancel_reports_removal() {
        let bus = crate::Bus::new(8);
        let relay = Relay::<u32>::with_bus("two", &bus);
        let sub = relay.subscribe_named("audit", |_| {});

        let mut diag = bus.subscribe();
        sub.cancel();

        let ev = diag.try_recv().expect("removal event");
        assert_eq!(ev.kind, crate::EventKind::ListenerRemoved);
        assert_eq!(ev.relay.as_deref(), Some("two"));
        assert_eq!(ev.listener.as_deref(), Some("audit"));
    }
}
