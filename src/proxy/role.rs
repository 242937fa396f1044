//! # Delegate roles.
//!
//! A *role* is the set of callbacks a delegate of some host type answers.
//! The callbacks themselves live in an ordinary trait written next to the
//! host, with a default no-op body for every method:
//!
//! ```rust
//! pub trait PlayerDelegate: Send + Sync {
//!     fn did_start(&self, _track: u32) {}
//!     fn did_finish(&self, _track: u32) {}
//!     fn should_skip(&self, _track: u32) -> bool { false }
//! }
//! ```
//!
//! [`Role`] connects that trait to a *relay bundle*: a plain struct holding
//! one [`Relay`](crate::Relay) per callback. The proxy for host `H` is
//! `DelegateProxy<H, Bundle>`, and the bundle type is what the registry
//! keys on, so a host/role mismatch is a type error.

use std::sync::Arc;

use crate::core::Config;
use crate::events::Bus;

use super::DelegateProxy;

/// Relay bundle for one delegate role of host type `H`.
pub trait Role<H>: Sized + Send + Sync + 'static {
    /// Role trait object type, e.g. `dyn PlayerDelegate`.
    type Delegate: ?Sized + Send + Sync + 'static;

    /// Builds one relay per callback. Relays built with
    /// [`Relay::with_config`](crate::Relay::with_config) report listener
    /// diagnostics on the registry's bus and follow its queue settings.
    fn relays(bus: &Bus, cfg: &Config) -> Self;

    /// Views the proxy as the role trait object. Implementations are
    /// always just `proxy`; the coercion needs the concrete types.
    fn as_delegate(proxy: Arc<DelegateProxy<H, Self>>) -> Arc<Self::Delegate>;
}
