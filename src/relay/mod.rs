//! # Relays: one multicast channel per delegate callback.
//!
//! A [`Relay`] is the channel a proxy publishes a single callback's events
//! on. Listeners come in three flavours:
//!
//! ```text
//!   Relay<T>::send(event)
//!        │
//!        ├──► subscribe(Fn(&T))            inline, publishing thread
//!        ├──► subscribe_on(Listen<T>, rt)  queued, worker on runtime `rt`
//!        └──► stream()                     queued, futures::Stream
//! ```
//!
//! Every attach returns a [`Subscription`]; dropping it detaches the listener.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use delegate_relay::Relay;
//!
//! let relay = Relay::<u32>::new("did_start");
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let h = Arc::clone(&hits);
//! let sub = relay.subscribe(move |_| { h.fetch_add(1, Ordering::SeqCst); });
//!
//! relay.send(1);
//! drop(sub);
//! relay.send(2);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

mod channel;
mod listen;
mod queue;
mod stream;
mod subscription;

pub use channel::Relay;
pub use listen::Listen;
pub use stream::EventStream;
pub use subscription::{Subscription, Subscriptions};
