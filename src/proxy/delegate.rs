//! # DelegateProxy: intercept a host's delegate slot.
//!
//! A [`DelegateProxy`] sits in a host's delegate slot. Every callback the host
//! makes is published on the matching relay and then forwarded to whatever
//! delegate was installed before the proxy took over.
//!
//! ## Lifecycle
//! ```text
//! DelegateProxy::create_with_config(host, bus, cfg)
//!   └─► host.exchange_delegate(|previous| ...)     one step under the slot lock
//!         ├─► forward = previous                   (non-owning)
//!         ├─► relays  = R::relays(bus, cfg)
//!         └─► slot    = Weak(proxy as R::Delegate)
//!   └─► host.retain_proxy(proxy)                   host owns the proxy
//!   └─► bus.publish(ProxyInstalled)
//!
//! host fires callback m(args)
//!   └─► proxy.m(args)
//!         ├─► relays.m.send(args)                  every listener, subscription order
//!         └─► forward?.m(args)                     skipped when absent or dropped
//! ```
//!
//! ## Ownership
//! - The host **owns** the proxy (via [`DelegateSlot::retain_proxy`]), so the
//!   proxy keeps forwarding for as long as the host lives, and is dropped with
//!   it. The proxy holds the host **weakly**, so there is no cycle.
//! - The [`ProxyRegistry`](crate::ProxyRegistry) only holds the proxy weakly.
//! - The original delegate is held **weakly** too; its owner decides how long
//!   it lives.
//!
//! ## Two callback shapes
//! - [`notify`](DelegateProxy::notify): broadcast-only callbacks (no return value).
//! - [`query`](DelegateProxy::query): callbacks whose answer the host uses;
//!   the original delegate's answer is returned unmodified.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::core::Config;
use crate::events::{Bus, Event, EventKind};
use crate::relay::Relay;

use super::role::Role;
use super::slot::DelegateSlot;

/// Delegate proxy for host `H` and relay bundle `R`.
pub struct DelegateProxy<H, R: Role<H>> {
    host: Weak<H>,
    forward: Option<Weak<R::Delegate>>,
    relays: R,
}

impl<H, R> DelegateProxy<H, R>
where
    H: DelegateSlot<R::Delegate>,
    R: Role<H>,
{
    /// Captures `host`'s current delegate and installs a new proxy in its
    /// place, with default relay settings.
    ///
    /// The host retains the proxy; dropping the returned `Arc` does not
    /// uninstall it. Use [`ProxyRegistry::get_or_create`](crate::ProxyRegistry::get_or_create)
    /// to get one proxy per host.
    pub fn create(host: &Arc<H>, bus: &Bus) -> Arc<Self> {
        Self::create_with_config(host, bus, &Config::default())
    }

    /// Same as [`create`](Self::create), building the relays with `cfg`.
    pub fn create_with_config(host: &Arc<H>, bus: &Bus, cfg: &Config) -> Arc<Self> {
        let proxy = host.exchange_delegate(|previous| {
            let proxy = Arc::new(Self {
                host: Arc::downgrade(host),
                forward: previous.filter(|w| w.strong_count() > 0),
                relays: R::relays(bus, cfg),
            });
            let installed = Arc::downgrade(&R::as_delegate(Arc::clone(&proxy)));
            (installed, proxy)
        });
        host.retain_proxy(Arc::clone(&proxy) as Arc<dyn Any + Send + Sync>);

        bus.publish(
            Event::new(EventKind::ProxyInstalled)
                .with_proxy(type_name::<H>(), type_name::<R>())
                .with_reason(if proxy.forward.is_some() {
                    "forwarding"
                } else {
                    "no_delegate"
                }),
        );
        proxy
    }
}

impl<H, R: Role<H>> DelegateProxy<H, R> {
    /// The relay bundle; subscribe to callbacks through it.
    pub fn relays(&self) -> &R {
        &self.relays
    }

    /// The host, if it is still alive.
    pub fn host(&self) -> Option<Arc<H>> {
        self.host.upgrade()
    }

    /// The delegate that was installed before this proxy, if it is still alive.
    pub fn forward_to_delegate(&self) -> Option<Arc<R::Delegate>> {
        self.forward.as_ref().and_then(Weak::upgrade)
    }

    /// True if an original delegate was captured and is still alive.
    pub fn has_original_delegate(&self) -> bool {
        self.forward.as_ref().is_some_and(|w| w.strong_count() > 0)
    }

    /// Broadcast-only callback: publish `event` on `relay`, then call
    /// `forward` on the original delegate if there is one.
    pub fn notify<T>(&self, relay: &Relay<T>, event: T, forward: impl FnOnce(&R::Delegate))
    where
        T: Clone + Send + Sync + 'static,
    {
        relay.send(event);
        if let Some(delegate) = self.forward_to_delegate() {
            forward(&*delegate);
        }
    }

    /// Value-returning callback: publish `event` on `relay`, then return the
    /// original delegate's answer unchanged, or `fallback()` without one.
    pub fn query<T, O>(
        &self,
        relay: &Relay<T>,
        event: T,
        forward: impl FnOnce(&R::Delegate) -> O,
        fallback: impl FnOnce() -> O,
    ) -> O
    where
        T: Clone + Send + Sync + 'static,
    {
        relay.send(event);
        match self.forward_to_delegate() {
            Some(delegate) => forward(&*delegate),
            None => fallback(),
        }
    }
}

impl<H, R: Role<H>> fmt::Debug for DelegateProxy<H, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateProxy")
            .field("host", &type_name::<H>())
            .field("role", &type_name::<R>())
            .field("host_alive", &(self.host.strong_count() > 0))
            .field("forwarding", &self.has_original_delegate())
            .finish()
    }
}
