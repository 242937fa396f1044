//! # LogWriter: diagnostics to `tracing`
//!
//! A small consumer that drains the diagnostics [`Bus`] and writes each
//! [`Event`] through `tracing`. Lifecycle events go out at `debug`, listener
//! failures at `warn`. Install any `tracing` subscriber to see them.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG delegate_relay: proxy installed host="app::Synth" role="app::SynthRelays" reason="forwarding"
//! DEBUG delegate_relay: listener added relay="did_start" listener="ui"
//!  WARN delegate_relay: listener panicked relay="did_start" listener="ui" info="boom"
//!  WARN delegate_relay: listener dropped event relay="did_finish" listener="audit" reason="full"
//! ```

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Bus, Event, EventKind};

/// Event writer backed by `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Spawns a task on the current tokio runtime that logs every event
    /// published on `bus` until `token` is cancelled or the bus closes.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime (as `tokio::spawn` does).
    pub fn spawn(self, bus: &Bus, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.write(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "log writer lagged behind diagnostics bus");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        })
    }

    /// Writes one event.
    pub fn write(&self, e: &Event) {
        let relay = e.relay.as_deref().unwrap_or("-");
        let listener = e.listener.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let host = e.host.unwrap_or("-");
        let role = e.role.unwrap_or("-");

        match e.kind {
            EventKind::ProxyInstalled => {
                tracing::debug!(seq = e.seq, host, role, reason, "proxy installed");
            }
            EventKind::ProxyPurged => {
                tracing::debug!(seq = e.seq, host, role, "proxy purged");
            }
            EventKind::ListenerAdded => {
                tracing::debug!(seq = e.seq, relay, listener, "listener added");
            }
            EventKind::ListenerRemoved => {
                tracing::debug!(seq = e.seq, relay, listener, "listener removed");
            }
            EventKind::ListenerPanicked => {
                tracing::warn!(seq = e.seq, relay, listener, info = reason, "listener panicked");
            }
            EventKind::ListenerOverflow => {
                tracing::warn!(seq = e.seq, relay, listener, reason, "listener dropped event");
            }
        }
    }
}
