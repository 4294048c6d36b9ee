use thiserror::Error;

/// A failed delivery to one observer.
///
/// Never crosses the broadcaster boundary: the observer is pruned and the
/// failure only shows up in logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Observer disconnected")]
    Disconnected,
    #[error("Observer queue is full")]
    Backpressure,
}
