//! # EventStream: a relay as a `futures::Stream`.
//!
//! Returned by [`Relay::stream`](crate::Relay::stream) and
//! [`Relay::bounded_stream`](crate::Relay::bounded_stream). Events wait in the
//! stream's own queue until polled. Only a bounded queue drops events (and
//! publishes `ListenerOverflow`) when the consumer falls behind. The stream
//! ends once the relay is dropped and the queue is drained.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use super::queue::QueueRx;
use super::subscription::Subscription;

/// Stream of events from one relay.
#[must_use = "streams do nothing unless polled; dropping unsubscribes"]
pub struct EventStream<T> {
    rx: QueueRx<T>,
    subscription: Subscription,
}

impl<T> EventStream<T> {
    pub(crate) fn new(rx: QueueRx<T>, subscription: Subscription) -> Self {
        Self { rx, subscription }
    }

    /// Waits for the next event. `None` once the relay is gone and the
    /// buffer is drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Takes a buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv()
    }

    /// True while still attached to the relay.
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

impl<T> Stream for EventStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use crate::Relay;

    #[tokio::test]
    async fn test_stream_yields_future_events_only() {
        let relay = Relay::<String>::new("two");
        relay.send("before".into());

        let mut stream = relay.stream();
        relay.send("a".into());
        relay.send("b".into());

        assert_eq!(stream.next().await.as_deref(), Some("a"));
        assert_eq!(stream.next().await.as_deref(), Some("b"));
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_stream_ends_when_relay_dropped() {
        let relay = Relay::<u32>::new("one");
        let mut stream = relay.stream();
        relay.send(7);
        drop(relay);

        assert!(!stream.is_active());
        assert_eq!(stream.recv().await, Some(7));
        assert_eq!(stream.recv().await, None);
    }

    #[test]
    fn test_dropping_stream_detaches() {
        let relay = Relay::<u32>::new("one");
        let stream = relay.stream();
        assert_eq!(relay.listener_count(), 1);
        drop(stream);
        assert_eq!(relay.listener_count(), 0);
    }
}
