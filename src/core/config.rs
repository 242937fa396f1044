//! # Registry configuration.
//!
//! Provides [`Config`] centralized settings for a [`ProxyRegistry`](crate::ProxyRegistry).
//!
//! Config is used in two ways:
//! 1. **Registry creation**: `ProxyRegistry::new(config)` sizes the diagnostics bus
//! 2. **Relay creation**: every relay a registry builds (through
//!    [`Role::relays`](crate::Role::relays)) takes its default listener queue
//!    limit from [`Config::queue_limit`]
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `queue_capacity = 0` → unbounded queues (lossless delivery)

/// Configuration for the proxy registry.
///
/// ## Field semantics
/// - `bus_capacity`: Diagnostics bus ring buffer size (min 1; clamped by Bus)
/// - `queue_capacity`: Default queue limit for queued listeners (`0` = unbounded)
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the diagnostics broadcast ring buffer.
    ///
    /// Receivers lagging more than `bus_capacity` events observe `Lagged`
    /// and skip older items.
    pub bus_capacity: usize,

    /// Default queue limit for listeners that are delivered on another
    /// execution context (`subscribe_on`, `subscribe_async`, `stream`).
    ///
    /// - `0` = unbounded: every event reaches every listener
    /// - `n > 0` = at most `n` pending events; when full, new events are
    ///   dropped for that listener only and `ListenerOverflow` is published
    ///
    /// A listener can still pick its own limit via
    /// [`Listen::queue_capacity`](crate::Listen::queue_capacity).
    pub queue_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the default listener queue limit as an `Option`.
    ///
    /// - `None` → unbounded, lossless
    /// - `Some(n)` → bounded, lossy on overflow
    #[inline]
    pub fn queue_limit(&self) -> Option<usize> {
        if self.queue_capacity == 0 {
            None
        } else {
            Some(self.queue_capacity)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `queue_capacity = 0` (unbounded)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            queue_capacity: 0,
        }
    }
}
