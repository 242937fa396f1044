//! # delegate-relay
//!
//! **delegate-relay** turns an object's single delegate slot into multicast
//! event relays while keeping the delegate that was already there.
//!
//! Many callback APIs allow exactly one delegate per object. This crate
//! installs a proxy in that slot, remembers the previous occupant, publishes
//! every callback on a per-callback [`Relay`] that any number of listeners
//! can subscribe to, and still forwards the call to the original delegate.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   caller A   │   │   caller B   │   │   caller C   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ProxyRegistry::get_or_create::<Host, Relays>(&host)              │
//! │  - one proxy per (host, role), created once under a mutex         │
//! │  - entries hold host and proxy weakly; the host owns its proxy    │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                  ┌─────────────────────────────┐
//!   host.slot ───► │ DelegateProxy<Host, Relays> │ ───► original delegate
//!   (weak, host    │ relays: one Relay per cb    │      (weak, optional)
//!   retains proxy) │                             │
//!                  └──────────────┬──────────────┘
//!                                 ▼
//!                ┌───────────────┼────────────────┐
//!                ▼               ▼                ▼
//!          inline Fn(&T)   Listen<T> worker   EventStream<T>
//!        (caller thread)   (chosen runtime)  (futures::Stream)
//! ```
//!
//! ### Callback flow
//! ```text
//! host fires m(args)
//!   ├─► proxy.relays().m.send(args)   each listener once, subscription order
//!   └─► original?.m(args)             no-op when absent or dropped
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                     |
//! |-------------------|--------------------------------------------------------------|----------------------------------------|
//! | **Registry**      | Memoized, race-free proxy creation per host and role.        | [`ProxyRegistry`]                      |
//! | **Proxy**         | Capture-then-install, publish, forward-to-delegate.          | [`DelegateProxy`], [`Role`]            |
//! | **Host side**     | Non-owning delegate slot.                                    | [`DelegateSlot`], [`WeakSlot`]         |
//! | **Relays**        | Hot multicast per callback, inline/queued/stream listeners.  | [`Relay`], [`Listen`], [`EventStream`] |
//! | **Subscriptions** | Drop-to-unsubscribe handles.                                 | [`Subscription`], [`Subscriptions`]    |
//! | **Diagnostics**   | Proxy and listener lifecycle on a broadcast bus.             | [`Bus`], [`Event`], [`EventKind`]      |
//! | **Errors**        | Typed errors.                                                | [`RelayError`]                         |
//! | **Configuration** | Bus and queue sizing.                                        | [`Config`]                             |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], which writes diagnostics through `tracing`.
//!
//! See the [`proxy`] module docs for a complete host/role wiring example.

mod core;
mod error;
mod events;
pub mod proxy;
mod relay;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use crate::core::{Config, ProxyRegistry};
pub use error::RelayError;
pub use events::{Bus, Event, EventKind};
pub use proxy::{DelegateProxy, DelegateSlot, Role, WeakSlot};
pub use relay::{EventStream, Listen, Relay, Subscription, Subscriptions};

// Optional: diagnostics writer backed by `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogWriter;
