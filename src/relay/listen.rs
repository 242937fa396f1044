//! # Deliver-on-context listener trait.
//!
//! Provides [`Listen`], the extension point for listeners that must observe
//! relay events on a specific execution context rather than inline in the
//! thread that fired the delegate callback.
//!
//! Each listener attached with [`Relay::subscribe_on`](crate::Relay::subscribe_on) gets:
//! - **Dedicated worker task** spawned on the chosen runtime
//! - **Per-listener queue** (unbounded, or limited via [`Listen::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `EventKind::ListenerPanicked`)
//!
//! ## Architecture
//! ```text
//! Relay::send ──► [own queue] ──► worker task ──► listener.on_event()
//!  (any thread)                └─► panic caught → EventKind::ListenerPanicked
//! ```
//!
//! ## Rules
//! - A slow listener only affects its own queue.
//! - With a queue limit, overflow drops the event **for this listener only**
//!   and publishes `EventKind::ListenerOverflow`; other listeners are unaffected.
//! - Events are processed sequentially (FIFO) per listener.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use delegate_relay::Listen;
//!
//! struct Captions;
//!
//! #[async_trait]
//! impl Listen<String> for Captions {
//!     async fn on_event(&self, word: &String) {
//!         let _ = word; // render the caption
//!     }
//!
//!     fn name(&self) -> &'static str { "captions" }
//!     fn queue_capacity(&self) -> Option<usize> { Some(64) }
//! }
//! ```

use async_trait::async_trait;

/// Listener delivered through a queue on its own worker task.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; a panic is contained but the event is lost.
#[async_trait]
pub trait Listen<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    /// Processes a single event.
    ///
    /// Called from the listener's worker task, never in the publishing context.
    async fn on_event(&self, event: &T);

    /// Returns the listener name used in overflow/panic diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns this listener's queue limit.
    ///
    /// - `None` → use the relay's default (unbounded unless the registry
    ///   [`Config`](crate::Config) sets a limit)
    /// - `Some(n)` → at most `n` pending events (min 1); overflow drops the
    ///   event for this listener only
    ///
    /// Default: `None`.
    fn queue_capacity(&self) -> Option<usize> {
        None
    }
}
