//! Change notification bridge.
//!
//! Turns "data changed" signals into cache invalidation plus a
//! `data_updated` broadcast. Signals carry no row information, so every
//! sales-derived key is dropped; `static:` keys survive. Signals arriving
//! within the debounce window of the first one are coalesced into a single
//! cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use salespulse_core::cache::{Cache, SALES_DERIVED_PATTERNS};
use salespulse_core::notify::{ChangeSignal, NotificationEvent};

use crate::notify::Broadcaster;

/// Pending signals beyond this are dropped; one cycle is already due.
const SIGNAL_QUEUE: usize = 256;

/// Sending half handed to change sources (e.g. the SQLite update hook).
///
/// `notify` never blocks, so it is safe to call from synchronous callbacks.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: mpsc::Sender<ChangeSignal>,
}

impl ChangeNotifier {
    pub fn notify(&self, signal: ChangeSignal) {
        match self.tx.try_send(signal) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => {}
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::trace!(origin = signal.origin, "Change bridge stopped, signal dropped");
            }
        }
    }
}

/// Consumes change signals and applies invalidation + broadcast cycles.
pub struct ChangeBridge {
    cache: Arc<dyn Cache>,
    broadcaster: Broadcaster,
    rx: mpsc::Receiver<ChangeSignal>,
    debounce: Duration,
}

impl ChangeBridge {
    /// Creates a bridge and the notifier feeding it.
    pub fn new(
        cache: Arc<dyn Cache>,
        broadcaster: Broadcaster,
        debounce: Duration,
    ) -> (ChangeNotifier, Self) {
        let (tx, rx) = mpsc::channel(SIGNAL_QUEUE);
        let bridge = Self {
            cache,
            broadcaster,
            rx,
            debounce,
        };
        (ChangeNotifier { tx }, bridge)
    }

    /// Runs until `shutdown` fires or every notifier is dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(debounce_ms = self.debounce.as_millis() as u64, "Change bridge started");

        loop {
            let first = tokio::select! {
                signal = self.rx.recv() => match signal {
                    Some(signal) => signal,
                    None => break,
                },
                _ = shutdown.recv() => break,
            };

            let coalesced = 1 + self.drain_window().await;
            self.apply(first.origin, coalesced).await;
        }

        tracing::debug!("Change bridge stopped");
    }

    /// Swallows signals until the debounce window closes, returning how
    /// many arrived.
    async fn drain_window(&mut self) -> usize {
        let mut extra = 0;

        if self.debounce.is_zero() {
            while self.rx.try_recv().is_ok() {
                extra += 1;
            }
            return extra;
        }

        let window = tokio::time::sleep(self.debounce);
        tokio::pin!(window);
        loop {
            tokio::select! {
                _ = &mut window => break,
                signal = self.rx.recv() => match signal {
                    Some(_) => extra += 1,
                    None => break,
                },
            }
        }
        extra
    }

    async fn apply(&self, origin: &'static str, coalesced: usize) {
        let mut invalidated = 0;
        for pattern in SALES_DERIVED_PATTERNS {
            match self.cache.invalidate_pattern(pattern).await {
                Ok(removed) => invalidated += removed,
                Err(err) => {
                    tracing::error!(pattern, error = %err, "Failed to invalidate cache");
                }
            }
        }

        let report = self.broadcaster.broadcast(&NotificationEvent::DataUpdated).await;

        tracing::info!(
            origin,
            coalesced,
            invalidated,
            delivered = report.delivered,
            "Data change applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::notify::Subscription;
    use salespulse_core::cache::{forecast_key, monthly_series_key, static_key};
    use salespulse_core::sales::AggregateQuery;

    struct Harness {
        cache: MemoryCache,
        notifier: ChangeNotifier,
        events: Subscription,
        shutdown: broadcast::Sender<()>,
        handle: tokio::task::JoinHandle<()>,
    }

    async fn start(debounce: Duration) -> Harness {
        let cache = MemoryCache::new(100);
        let broadcaster = Broadcaster::new();
        let events = broadcaster.subscribe(16).await;
        let (notifier, bridge) = ChangeBridge::new(Arc::new(cache.clone()), broadcaster, debounce);
        let (shutdown, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(bridge.run(shutdown_rx));
        Harness {
            cache,
            notifier,
            events,
            shutdown,
            handle,
        }
    }

    async fn next_event(events: &mut Subscription) -> NotificationEvent {
        tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_signal_invalidates_sales_keys_and_broadcasts() {
        let mut h = start(Duration::ZERO).await;
        let summary = AggregateQuery::Summary.cache_key();
        h.cache
            .set(&summary, br#"{"total":100}"#, Some(Duration::from_secs(60)))
            .await
            .unwrap();
        h.cache.set(&monthly_series_key("Books"), b"[]", None).await.unwrap();
        h.cache.set(&forecast_key("Books", 3), b"[]", None).await.unwrap();
        h.cache.set(&static_key("regions"), b"[]", None).await.unwrap();

        assert_eq!(
            h.cache.get(&summary).await.unwrap(),
            Some(br#"{"total":100}"#.to_vec())
        );

        h.notifier.notify(ChangeSignal::new("test"));

        assert_eq!(next_event(&mut h.events).await, NotificationEvent::DataUpdated);
        assert!(h.cache.get(&summary).await.unwrap().is_none());
        assert!(h.cache.get(&monthly_series_key("Books")).await.unwrap().is_none());
        assert!(h.cache.get(&forecast_key("Books", 3)).await.unwrap().is_none());
        assert!(h.cache.get(&static_key("regions")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_burst_is_coalesced() {
        let mut h = start(Duration::from_millis(100)).await;

        for _ in 0..25 {
            h.notifier.notify(ChangeSignal::new("burst"));
        }

        assert_eq!(next_event(&mut h.events).await, NotificationEvent::DataUpdated);
        let extra = tokio::time::timeout(Duration::from_millis(250), h.events.recv()).await;
        assert!(extra.is_err(), "expected a single data_updated, got {extra:?}");
    }

    #[tokio::test]
    async fn test_signals_after_window_start_new_cycle() {
        let mut h = start(Duration::from_millis(20)).await;

        h.notifier.notify(ChangeSignal::new("first"));
        assert_eq!(next_event(&mut h.events).await, NotificationEvent::DataUpdated);

        h.notifier.notify(ChangeSignal::new("second"));
        assert_eq!(next_event(&mut h.events).await, NotificationEvent::DataUpdated);
    }

    #[tokio::test]
    async fn test_shutdown_stops_bridge() {
        let h = start(Duration::from_millis(10)).await;
        h.shutdown.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), h.handle)
            .await
            .unwrap()
            .unwrap();

        // Notifying a stopped bridge is harmless.
        h.notifier.notify(ChangeSignal::new("late"));
    }

    #[tokio::test]
    async fn test_bridge_exits_when_notifiers_drop() {
        let h = start(Duration::ZERO).await;
        drop(h.notifier);
        tokio::time::timeout(Duration::from_secs(1), h.handle)
            .await
            .unwrap()
            .unwrap();
    }
}
