//! Diagnostics: event types and broadcast bus.
//!
//! This module groups the diagnostic **data model** and the **bus** used to
//! report what the relay machinery does: proxies being installed or purged,
//! listeners joining, leaving, panicking or overflowing.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//! - `LogWriter` (feature `logging`) writes events through `tracing`
//!
//! ## Quick reference
//! - **Publishers**: `ProxyRegistry`, `DelegateProxy::create`, `Relay` (inline
//!   listeners and queue workers).
//! - **Consumers**: `LogWriter`, or any receiver from [`Bus::subscribe`].

mod bus;
mod event;
#[cfg(feature = "logging")]
mod log;

pub use bus::Bus;
pub use event::{Event, EventKind};
#[cfg(feature = "logging")]
pub use log::LogWriter;
