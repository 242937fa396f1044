//! Registry core: memoized proxies and their configuration.
//!
//! The only public API from this module is [`ProxyRegistry`] and its
//! [`Config`].
//!
//! Internal modules:
//! - [`config`]: bus and queue sizing;
//! - [`registry`]: insert-if-absent of one proxy per (host, role).

mod config;
mod registry;

pub use config::Config;
pub use registry::ProxyRegistry;
