//! Unbounded single-producer single-consumer hand-off between sequencer and renderer.

use crate::message::RelayMessage;
use std::time::Duration;
use tokio::sync::mpsc;

/// Creates a connected sender/receiver pair.
pub fn relay_channel() -> (RelaySender, RelayReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RelaySender { tx }, RelayReceiver { rx })
}

#[derive(Debug)]
pub struct RelaySender {
    tx: mpsc::UnboundedSender<RelayMessage>,
}

impl RelaySender {
    /// Enqueues `message`; returns `false` when the receiver is gone.
    pub fn push(&self, message: RelayMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}

/// Result of [`RelayReceiver::recv_timeout`]: an item, channel closed, or timeout.
#[derive(Debug, PartialEq, Eq)]
pub enum RecvOutcome {
    Item(RelayMessage),
    Closed,
    Timeout,
}

#[derive(Debug)]
pub struct RelayReceiver {
    rx: mpsc::UnboundedReceiver<RelayMessage>,
}

impl RelayReceiver {
    pub async fn recv(&mut self) -> Option<RelayMessage> {
        self.rx.recv().await
    }

    /// Receives one item, racing with a sleep of `timeout`. Items queued when the sleep wins stay
    /// queued.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> RecvOutcome {
        tokio::select! {
            result = self.rx.recv() => match result {
                Some(message) => RecvOutcome::Item(message),
                None => RecvOutcome::Closed,
            },
            _ = tokio::time::sleep(timeout) => RecvOutcome::Timeout,
        }
    }
}
