//! # Delegate proxies.
//!
//! - [`DelegateSlot`] / [`WeakSlot`]: the host side, one non-owning delegate slot
//! - [`Role`]: ties a host's delegate trait to a bundle of relays
//! - [`DelegateProxy`]: sits in the slot, publishes and forwards
//!
//! ## Wiring a host
//! ```rust
//! use std::any::Any;
//! use std::sync::{Arc, Weak};
//! use delegate_relay::{
//!     Bus, Config, DelegateProxy, DelegateSlot, ProxyRegistry, Relay, Role, WeakSlot,
//! };
//!
//! // Host with a single delegate slot.
//! pub trait PlayerDelegate: Send + Sync {
//!     fn did_finish(&self, _player: &Player, _track: u32) {}
//! }
//!
//! #[derive(Default)]
//! pub struct Player {
//!     delegate: WeakSlot<dyn PlayerDelegate>,
//! }
//!
//! impl Player {
//!     pub fn finish(&self, track: u32) {
//!         if let Some(d) = self.delegate.upgrade() {
//!             d.did_finish(self, track);
//!         }
//!     }
//! }
//!
//! impl DelegateSlot<dyn PlayerDelegate> for Player {
//!     fn delegate(&self) -> Option<Weak<dyn PlayerDelegate>> { self.delegate.get() }
//!     fn set_delegate(&self, d: Option<Weak<dyn PlayerDelegate>>) { self.delegate.set(d) }
//!     fn exchange_delegate<T>(
//!         &self,
//!         install: impl FnOnce(Option<Weak<dyn PlayerDelegate>>) -> (Weak<dyn PlayerDelegate>, T),
//!     ) -> T {
//!         self.delegate.exchange(install)
//!     }
//!     fn retain_proxy(&self, proxy: Arc<dyn Any + Send + Sync>) { self.delegate.retain(proxy) }
//! }
//!
//! // One relay per callback.
//! pub struct PlayerRelays {
//!     pub did_finish: Relay<u32>,
//! }
//!
//! impl Role<Player> for PlayerRelays {
//!     type Delegate = dyn PlayerDelegate;
//!
//!     fn relays(bus: &Bus, cfg: &Config) -> Self {
//!         Self { did_finish: Relay::with_config("did_finish", bus, cfg) }
//!     }
//!
//!     fn as_delegate(proxy: Arc<DelegateProxy<Player, Self>>) -> Arc<dyn PlayerDelegate> {
//!         proxy
//!     }
//! }
//!
//! impl PlayerDelegate for DelegateProxy<Player, PlayerRelays> {
//!     fn did_finish(&self, player: &Player, track: u32) {
//!         self.notify(&self.relays().did_finish, track, |d| d.did_finish(player, track));
//!     }
//! }
//!
//! let registry = ProxyRegistry::new(Default::default());
//! let player = Arc::new(Player::default());
//!
//! let proxy = registry.get_or_create::<Player, PlayerRelays>(&player);
//! let mut finished = proxy.relays().did_finish.stream();
//!
//! player.finish(3);
//! assert_eq!(finished.try_recv(), Some(3));
//! ```

mod delegate;
mod role;
mod slot;

pub use delegate::DelegateProxy;
pub use role::Role;
pub use slot::{DelegateSlot, WeakSlot};
