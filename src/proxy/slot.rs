//! # Host delegate slot.
//!
//! A host is any object with exactly one delegate slot for a role `D`
//! (a trait object type such as `dyn PlayerDelegate`). The slot is
//! non-owning: it holds a [`Weak`], so installing a delegate never keeps it
//! alive.
//!
//! Proxies are the exception. A host *retains* every proxy installed on it
//! ([`DelegateSlot::retain_proxy`]), so a proxy lives exactly as long as its
//! host, whoever else drops their handles.
//!
//! Hosts either implement [`DelegateSlot`] by hand or embed a [`WeakSlot`]
//! and forward to it.
//!
//! ## Example
//! ```rust
//! use std::any::Any;
//! use std::sync::{Arc, Weak};
//! use delegate_relay::{DelegateSlot, WeakSlot};
//!
//! pub trait PlayerDelegate: Send + Sync {
//!     fn did_finish(&self, _track: u32) {}
//! }
//!
//! #[derive(Default)]
//! pub struct Player {
//!     delegate: WeakSlot<dyn PlayerDelegate>,
//! }
//!
//! impl DelegateSlot<dyn PlayerDelegate> for Player {
//!     fn delegate(&self) -> Option<Weak<dyn PlayerDelegate>> {
//!         self.delegate.get()
//!     }
//!     fn set_delegate(&self, delegate: Option<Weak<dyn PlayerDelegate>>) {
//!         self.delegate.set(delegate);
//!     }
//!     fn exchange_delegate<T>(
//!         &self,
//!         install: impl FnOnce(Option<Weak<dyn PlayerDelegate>>) -> (Weak<dyn PlayerDelegate>, T),
//!     ) -> T {
//!         self.delegate.exchange(install)
//!     }
//!     fn retain_proxy(&self, proxy: Arc<dyn Any + Send + Sync>) {
//!         self.delegate.retain(proxy);
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// An object with a single, non-owning delegate slot for role `D`.
pub trait DelegateSlot<D>: Send + Sync + 'static
where
    D: ?Sized + 'static,
{
    /// Current slot value.
    fn delegate(&self) -> Option<Weak<D>>;

    /// Replaces the slot value.
    fn set_delegate(&self, delegate: Option<Weak<D>>);

    /// Reads the previous value and installs the one produced by `install`
    /// as a single step.
    ///
    /// The default is read-then-write. Hosts whose slot can be written from
    /// several threads should override it so nothing can slip in between.
    fn exchange_delegate<T>(&self, install: impl FnOnce(Option<Weak<D>>) -> (Weak<D>, T)) -> T {
        let (next, out) = install(self.delegate());
        self.set_delegate(Some(next));
        out
    }

    /// Takes shared ownership of a proxy installed in this slot. The host
    /// must keep it until the host itself is dropped.
    fn retain_proxy(&self, proxy: Arc<dyn Any + Send + Sync>);

    /// Upgraded current delegate, if set and still alive.
    fn current_delegate(&self) -> Option<Arc<D>> {
        self.delegate().and_then(|w| w.upgrade())
    }
}

/// Mutex-guarded `Option<Weak<D>>` for embedding in host types, plus the
/// proxies retained on the host's behalf.
pub struct WeakSlot<D: ?Sized> {
    inner: Mutex<Option<Weak<D>>>,
    retained: Mutex<Vec<Arc<dyn Any + Send + Sync>>>,
}

impl<D: ?Sized> WeakSlot<D> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
            retained: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Weak<D>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value.
    pub fn get(&self) -> Option<Weak<D>> {
        self.lock().clone()
    }

    /// Replaces the value.
    pub fn set(&self, delegate: Option<Weak<D>>) {
        *self.lock() = delegate;
    }

    /// Read-and-replace under the slot lock.
    ///
    /// `install` must not touch this slot.
    pub fn exchange<T>(&self, install: impl FnOnce(Option<Weak<D>>) -> (Weak<D>, T)) -> T {
        let mut guard = self.lock();
        let (next, out) = install(guard.take());
        *guard = Some(next);
        out
    }

    /// Keeps `owned` alive until this slot is dropped.
    pub fn retain(&self, owned: Arc<dyn Any + Send + Sync>) {
        self.retained
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(owned);
    }

    /// Current delegate, upgraded. The lock is released before returning, so
    /// callers may invoke the delegate freely.
    pub fn upgrade(&self) -> Option<Arc<D>> {
        self.lock().as_ref().and_then(Weak::upgrade)
    }
}

impl<D: ?Sized> Default for WeakSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ?Sized> fmt::Debug for WeakSlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.lock().as_ref() {
            None => "empty",
            Some(w) if w.strong_count() == 0 => "dangling",
            Some(_) => "set",
        };
        let retained = self
            .retained
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("WeakSlot")
            .field("state", &state)
            .field("retained", &retained)
            .finish()
    }
}
