//! Notification events and the observer seam used by the broadcaster.

mod error;
mod event;
mod traits;

pub use error::DeliveryError;
pub use event::{ChangeSignal, NotificationEvent, ObserverId};
pub use traits::Observer;
