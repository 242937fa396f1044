//! Error types used by delegate-relay.
//!
//! The relay core is infallible in normal use: a missing original delegate is
//! an ordinary `None`, host/role pairing is checked at compile time and
//! concurrent registration is serialized. The one failure left is asking for
//! asynchronous delivery without a runtime to deliver on.
//!
//! [`RelayError`] provides helper methods (`as_label`, `as_message`) for logging.

use thiserror::Error;

/// # Errors produced by relay subscription.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RelayError {
    /// A deliver-on-context listener was requested outside a tokio runtime.
    #[error("no tokio runtime to deliver relay '{relay}' on")]
    NoRuntime {
        /// Name of the relay the listener tried to join.
        relay: String,
    },
}

impl RelayError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use delegate_relay::RelayError;
    ///
    /// let err = RelayError::NoRuntime { relay: "did_start".into() };
    /// assert_eq!(err.as_label(), "relay_no_runtime");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RelayError::NoRuntime { .. } => "relay_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RelayError::NoRuntime { relay } => {
                format!("no runtime available; relay={relay}")
            }
        }
    }
}
