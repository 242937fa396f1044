//! Test host and role shared by the unit tests.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use crate::core::Config;
use crate::events::Bus;
use crate::proxy::{DelegateProxy, DelegateSlot, Role, WeakSlot};
use crate::relay::Relay;

pub(crate) trait SomeTypeDelegate: Send + Sync {
    fn with_one(&self, _host: &SomeType, _value: i32) {}
    fn with_two(&self, _host: &SomeType, _value: String) {}
    fn should_advance(&self, _host: &SomeType, _step: u32) -> bool {
        true
    }
}

#[derive(Default)]
pub(crate) struct SomeType {
    delegate: WeakSlot<dyn SomeTypeDelegate>,
}

impl SomeType {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn call_one(&self) {
        if let Some(d) = self.delegate.upgrade() {
            d.with_one(self, 1);
        }
    }

    pub(crate) fn call_two(&self) {
        if let Some(d) = self.delegate.upgrade() {
            d.with_two(self, "call_two".to_string());
        }
    }

    pub(crate) fn advance(&self, step: u32) -> bool {
        self.delegate
            .upgrade()
            .map_or(true, |d| d.should_advance(self, step))
    }
}

impl DelegateSlot<dyn SomeTypeDelegate> for SomeType {
    fn delegate(&self) -> Option<Weak<dyn SomeTypeDelegate>> {
        self.delegate.get()
    }

    fn set_delegate(&self, delegate: Option<Weak<dyn SomeTypeDelegate>>) {
        self.delegate.set(delegate);
    }

    fn exchange_delegate<T>(
        &self,
        install: impl FnOnce(Option<Weak<dyn SomeTypeDelegate>>) -> (Weak<dyn SomeTypeDelegate>, T),
    ) -> T {
        self.delegate.exchange(install)
    }

    fn retain_proxy(&self, proxy: Arc<dyn Any + Send + Sync>) {
        self.delegate.retain(proxy);
    }
}

/// Pre-existing delegate that counts its callbacks.
pub(crate) struct Counting {
    pub(crate) one: AtomicUsize,
    pub(crate) two: AtomicUsize,
    pub(crate) advance: AtomicBool,
}

impl Counting {
    /// Installs a fresh counter on `host`. The caller keeps it alive.
    pub(crate) fn install(host: &SomeType) -> Arc<Self> {
        let me = Arc::new(Self {
            one: AtomicUsize::new(0),
            two: AtomicUsize::new(0),
            advance: AtomicBool::new(true),
        });
        let as_delegate: Arc<dyn SomeTypeDelegate> = me.clone();
        host.set_delegate(Some(Arc::downgrade(&as_delegate)));
        me
    }
}

impl SomeTypeDelegate for Counting {
    fn with_one(&self, _host: &SomeType, _value: i32) {
        self.one.fetch_add(1, Ordering::SeqCst);
    }

    fn with_two(&self, _host: &SomeType, _value: String) {
        self.two.fetch_add(1, Ordering::SeqCst);
    }

    fn should_advance(&self, _host: &SomeType, _step: u32) -> bool {
        self.advance.load(Ordering::SeqCst)
    }
}

pub(crate) struct SomeTypeRelays {
    pub(crate) one: Relay<i32>,
    pub(crate) two: Relay<String>,
    pub(crate) advance: Relay<u32>,
}

impl Role<SomeType> for SomeTypeRelays {
    type Delegate = dyn SomeTypeDelegate;

    fn relays(bus: &Bus, cfg: &Config) -> Self {
        Self {
            one: Relay::with_config("one", bus, cfg),
            two: Relay::with_config("two", bus, cfg),
            advance: Relay::with_config("advance", bus, cfg),
        }
    }

    fn as_delegate(proxy: Arc<DelegateProxy<SomeType, Self>>) -> Arc<dyn SomeTypeDelegate> {
        proxy
    }
}

impl SomeTypeDelegate for DelegateProxy<SomeType, SomeTypeRelays> {
    fn with_one(&self, host: &SomeType, value: i32) {
        self.notify(&self.relays().one, value, |d| d.with_one(host, value));
    }

    fn with_two(&self, host: &SomeType, value: String) {
        self.notify(&self.relays().two, value.clone(), |d| d.with_two(host, value));
    }

    fn should_advance(&self, host: &SomeType, step: u32) -> bool {
        self.query(
            &self.relays().advance,
            step,
            |d| d.should_advance(host, step),
            || true,
        )
    }
}
