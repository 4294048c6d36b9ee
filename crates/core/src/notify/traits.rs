use async_trait::async_trait;

use super::{DeliveryError, NotificationEvent};

/// A live connection that can receive notification events.
///
/// `deliver` must not wait on the remote peer: implementations hand the
/// event to a local queue and report `Backpressure` when it is full. Any
/// error marks the observer as disconnected.
#[async_trait]
pub trait Observer: Send + Sync {
    async fn deliver(&self, event: &NotificationEvent) -> Result<(), DeliveryError>;
}
