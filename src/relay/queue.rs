//! Per-listener queue: unbounded (lossless) or bounded (lossy on overflow).

use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Why an event was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejected {
    Full,
    Closed,
}

impl Rejected {
    pub(crate) fn as_reason(self) -> &'static str {
        match self {
            Rejected::Full => "full",
            Rejected::Closed => "closed",
        }
    }
}

pub(crate) enum QueueTx<T> {
    Unbounded(mpsc::UnboundedSender<T>),
    Bounded(mpsc::Sender<T>),
}

impl<T> Clone for QueueTx<T> {
    fn clone(&self) -> Self {
        match self {
            QueueTx::Unbounded(tx) => QueueTx::Unbounded(tx.clone()),
            QueueTx::Bounded(tx) => QueueTx::Bounded(tx.clone()),
        }
    }
}

impl<T> QueueTx<T> {
    /// Enqueues without waiting.
    pub(crate) fn push(&self, event: T) -> Result<(), Rejected> {
        match self {
            QueueTx::Unbounded(tx) => tx.send(event).map_err(|_| Rejected::Closed),
            QueueTx::Bounded(tx) => tx.try_send(event).map_err(|e| match e {
                TrySendError::Full(_) => Rejected::Full,
                TrySendError::Closed(_) => Rejected::Closed,
            }),
        }
    }
}

pub(crate) enum QueueRx<T> {
    Unbounded(mpsc::UnboundedReceiver<T>),
    Bounded(mpsc::Receiver<T>),
}

impl<T> QueueRx<T> {
    pub(crate) async fn recv(&mut self) -> Option<T> {
        match self {
            QueueRx::Unbounded(rx) => rx.recv().await,
            QueueRx::Bounded(rx) => rx.recv().await,
        }
    }

    pub(crate) fn try_recv(&mut self) -> Option<T> {
        match self {
            QueueRx::Unbounded(rx) => rx.try_recv().ok(),
            QueueRx::Bounded(rx) => rx.try_recv().ok(),
        }
    }

    pub(crate) fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>> {
        match self {
            QueueRx::Unbounded(rx) => rx.poll_recv(cx),
            QueueRx::Bounded(rx) => rx.poll_recv(cx),
        }
    }
}

/// `None` builds an unbounded queue, `Some(n)` a bounded one of at least 1.
pub(crate) fn channel<T>(limit: Option<usize>) -> (QueueTx<T>, QueueRx<T>) {
    match limit {
        Some(cap) => {
            let (tx, rx) = mpsc::channel(cap.max(1));
            (QueueTx::Bounded(tx), QueueRx::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (QueueTx::Unbounded(tx), QueueRx::Unbounded(rx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_rejects_while_open() {
        let (tx, mut rx) = channel::<u32>(None);
        for i in 0..10_000 {
            assert_eq!(tx.push(i), Ok(()));
        }
        assert_eq!(rx.try_recv(), Some(0));

        drop(rx);
        assert_eq!(tx.push(1), Err(Rejected::Closed));
    }

    #[test]
    fn test_bounded_rejects_when_full() {
        let (tx, _rx) = channel::<u32>(Some(0));
        assert_eq!(tx.push(1), Ok(()));
        assert_eq!(tx.push(2), Err(Rejected::Full));
        assert_eq!(Rejected::Full.as_reason(), "full");
    }
}
