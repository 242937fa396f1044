//! # Diagnostic events emitted by the registry, proxies and relays.
//!
//! The [`EventKind`] enum classifies diagnostics across two categories:
//! - **Proxy events**: a proxy was installed on a host, or purged after its host died
//! - **Listener events**: listeners joined or left a relay, panicked, or overflowed
//!
//! The [`Event`] struct carries metadata such as timestamps, host/role type names,
//! the relay name and a human-readable reason.
//!
//! These are *diagnostics about the relay machinery*, not the delegate callbacks
//! themselves. Callback payloads travel over [`Relay`](crate::Relay) channels.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use delegate_relay::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ListenerPanicked)
//!     .with_relay("did_finish")
//!     .with_listener("audit")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::ListenerPanicked);
//! assert_eq!(ev.relay.as_deref(), Some("did_finish"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Proxy events ===
    /// A proxy captured the host's delegate and installed itself.
    ///
    /// Sets:
    /// - `host`: host type name
    /// - `role`: relay bundle type name
    /// - `reason`: `"forwarding"` when an original delegate was captured, `"no_delegate"` otherwise
    ProxyInstalled,

    /// A registry entry was dropped because its host no longer exists.
    ///
    /// Sets:
    /// - `host`: host type name
    /// - `role`: relay bundle type name
    ProxyPurged,

    // === Listener events ===
    /// A listener subscribed to a relay.
    ///
    /// Sets:
    /// - `relay`: relay name
    /// - `listener`: listener name
    ListenerAdded,

    /// A listener's subscription was disposed.
    ///
    /// Sets:
    /// - `relay`: relay name
    /// - `listener`: listener name
    ListenerRemoved,

    /// A listener panicked while handling an event. Delivery to the other
    /// listeners continued.
    ///
    /// Sets:
    /// - `relay`: relay name
    /// - `listener`: listener name
    /// - `reason`: panic message
    ListenerPanicked,

    /// A queued listener dropped an event (bounded queue full, or worker gone).
    ///
    /// Sets:
    /// - `relay`: relay name
    /// - `listener`: listener name
    /// - `reason`: `"full"` or `"closed"`
    ListenerOverflow,
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Host type name, if applicable.
    pub host: Option<&'static str>,
    /// Relay bundle (role) type name, if applicable.
    pub role: Option<&'static str>,
    /// Relay name, if applicable.
    pub relay: Option<Arc<str>>,
    /// Listener name, if applicable.
    pub listener: Option<Arc<str>>,
    /// Human-readable reason (panic message, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            host: None,
            role: None,
            relay: None,
            listener: None,
            reason: None,
        }
    }

    /// Attaches host and role type names.
    #[inline]
    pub fn with_proxy(mut self, host: &'static str, role: &'static str) -> Self {
        self.host = Some(host);
        self.role = Some(role);
        self
    }

    /// Attaches a relay name.
    #[inline]
    pub fn with_relay(mut self, relay: impl Into<Arc<str>>) -> Self {
        self.relay = Some(relay.into());
        self
    }

    /// Attaches a listener name.
    #[inline]
    pub fn with_listener(mut self, listener: impl Into<Arc<str>>) -> Self {
        self.listener = Some(listener.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a listener overflow event.
    #[inline]
    pub fn listener_overflow(relay: &str, listener: &str, reason: &'static str) -> Self {
        Event::new(EventKind::ListenerOverflow)
            .with_relay(relay)
            .with_listener(listener)
            .with_reason(reason)
    }

    /// Creates a listener panic event.
    #[inline]
    pub fn listener_panicked(relay: &str, listener: &str, info: String) -> Self {
        Event::new(EventKind::ListenerPanicked)
            .with_relay(relay)
            .with_listener(listener)
            .with_reason(info)
    }

    #[inline]
    pub fn is_listener_overflow(&self) -> bool {
        matches!(self.kind, EventKind::ListenerOverflow)
    }

    #[inline]
    pub fn is_listener_panic(&self) -> bool {
        matches!(self.kind, EventKind::ListenerPanicked)
    }
}
