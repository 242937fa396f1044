//! # Proxy registry: one proxy per (host, role).
//!
//! [`ProxyRegistry`] memoizes proxies so every caller asking for "the proxy
//! for this host" gets the same instance, and the host's delegate slot is
//! intercepted exactly once.
//!
//! ## Architecture
//! ```text
//! get_or_create::<H, R>(&host)
//!   └─► lock entries
//!         ├─► hit (host alive, same role) ─► return cached proxy
//!         └─► miss ─► purge dead hosts ─► factory(host) ─► insert ─► return
//! ```
//!
//! ## Rules
//! - **Exactly once**: insert-if-absent runs under one mutex, so concurrent
//!   first access from many threads runs the factory once.
//! - **Keyed by identity**: the key is the host's address plus the proxy
//!   type, so one host can carry several roles, one proxy each.
//! - **Non-owning**: entries hold both the host and the proxy weakly. The
//!   host owns its proxy, so dropping the registry never stops forwarding,
//!   and a dead host takes its proxy, relays and listener workers with it.
//!   The leftover entries are purged on the next insert or by
//!   [`ProxyRegistry::purge`]; a recycled address never resolves to a stale
//!   proxy.
//! - **No re-entry**: the factory runs under the registry lock and must not
//!   call back into the same registry.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::core::Config;
use crate::events::{Bus, Event, EventKind};
use crate::proxy::{DelegateProxy, DelegateSlot, Role};

/// Host address + proxy type.
type Key = (usize, TypeId);

/// One memoized proxy. Owned by its host, not by the registry.
struct Entry {
    host: Weak<dyn Any + Send + Sync>,
    proxy: Weak<dyn Any + Send + Sync>,
    host_name: &'static str,
    role_name: &'static str,
}

impl Entry {
    fn is_alive(&self) -> bool {
        self.host.strong_count() > 0
    }
}

/// Registry of delegate proxies, shared by everyone who proxies the same hosts.
pub struct ProxyRegistry {
    entries: Mutex<HashMap<Key, Entry>>,
    bus: Bus,
    cfg: Config,
}

impl ProxyRegistry {
    /// Creates a new registry.
    pub fn new(cfg: Config) -> Arc<Self> {
        Arc::new(Self::build(cfg))
    }

    fn build(cfg: Config) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            bus: Bus::new(cfg.bus_capacity_clamped()),
            cfg,
        }
    }

    /// Diagnostics bus shared by this registry's proxies and relays.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Configuration this registry was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the proxy for `host`, creating and installing it on first use.
    pub fn get_or_create<H, R>(&self, host: &Arc<H>) -> Arc<DelegateProxy<H, R>>
    where
        H: DelegateSlot<R::Delegate>,
        R: Role<H>,
    {
        self.get_or_create_with(host, |h| {
            DelegateProxy::create_with_config(h, &self.bus, &self.cfg)
        })
    }

    /// Same as [`get_or_create`](Self::get_or_create) with a custom factory.
    ///
    /// The factory runs at most once per live host and is expected to install
    /// the proxy it returns and have the host retain it (as
    /// [`DelegateProxy::create`] does). The registry keeps only a weak handle.
    pub fn get_or_create_with<H, R, F>(&self, host: &Arc<H>, factory: F) -> Arc<DelegateProxy<H, R>>
    where
        H: DelegateSlot<R::Delegate>,
        R: Role<H>,
        F: FnOnce(&Arc<H>) -> Arc<DelegateProxy<H, R>>,
    {
        let key = Self::key::<H, R>(host);
        let mut entries = self.lock();

        if let Some(proxy) = entries.get(&key).and_then(Self::live_proxy::<H, R>) {
            return proxy;
        }

        self.purge_locked(&mut entries);
        let proxy = factory(host);

        let weak_host: Weak<H> = Arc::downgrade(host);
        let weak_proxy: Weak<DelegateProxy<H, R>> = Arc::downgrade(&proxy);
        entries.insert(
            key,
            Entry {
                host: weak_host,
                proxy: weak_proxy,
                host_name: type_name::<H>(),
                role_name: type_name::<R>(),
            },
        );
        proxy
    }

    /// Returns the proxy for `host` if one exists, without creating it.
    pub fn get<H, R>(&self, host: &Arc<H>) -> Option<Arc<DelegateProxy<H, R>>>
    where
        H: DelegateSlot<R::Delegate>,
        R: Role<H>,
    {
        let key = Self::key::<H, R>(host);
        self.lock().get(&key).and_then(Self::live_proxy::<H, R>)
    }

    /// Drops entries whose host no longer exists. Returns how many were dropped.
    pub fn purge(&self) -> usize {
        let mut entries = self.lock();
        self.purge_locked(&mut entries)
    }

    /// Number of entries, including ones whose host died since the last purge.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no proxies are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn lock(&self) -> MutexGuard<'_, HashMap<Key, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key<H, R>(host: &Arc<H>) -> Key
    where
        H: 'static,
        R: Role<H>,
    {
        (
            Arc::as_ptr(host) as *const () as usize,
            TypeId::of::<DelegateProxy<H, R>>(),
        )
    }

    fn live_proxy<H, R>(entry: &Entry) -> Option<Arc<DelegateProxy<H, R>>>
    where
        H: DelegateSlot<R::Delegate>,
        R: Role<H>,
    {
        if !entry.is_alive() {
            return None;
        }
        // The key carries the proxy's TypeId, so the downcast cannot fail.
        entry.proxy.upgrade()?.downcast::<DelegateProxy<H, R>>().ok()
    }

    /// Removes dead entries and reports each one.
    fn purge_locked(&self, entries: &mut HashMap<Key, Entry>) -> usize {
        let before = entries.len();
        entries.retain(|_, e| {
            if e.is_alive() {
                return true;
            }
            self.bus.publish(Event::new(EventKind::ProxyPurged).with_proxy(e.host_name, e.role_name));
            false
        });
        before - entries.len()
    }
}

impl Default for ProxyRegistry {
    fn default() -> Self {
        Self::build(Config::default())
    }
}
