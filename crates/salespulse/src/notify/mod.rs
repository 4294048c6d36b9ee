//! Observer registry and fan-out of notification events.

mod broadcaster;
mod channel;

pub use broadcaster::{Broadcaster, Subscription};
pub use channel::ChannelObserver;
