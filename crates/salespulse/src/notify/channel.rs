use async_trait::async_trait;
use tokio::sync::mpsc;

use salespulse_core::notify::{DeliveryError, NotificationEvent, Observer};

/// Observer backed by a bounded channel drained by a connection task.
///
/// Delivery never waits: a full queue means the peer is too slow and is
/// reported as `Backpressure`, which gets the observer pruned.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<NotificationEvent>,
}

impl ChannelObserver {
    /// Creates an observer and the receiving end its connection drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NotificationEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Observer for ChannelObserver {
    async fn deliver(&self, event: &NotificationEvent) -> Result<(), DeliveryError> {
        self.tx.try_send(event.clone()).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Disconnected,
        })
    }
}
