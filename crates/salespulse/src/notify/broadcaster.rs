//! Registry of live observers with best-effort fan-out.
//!
//! A broadcast snapshots the registry, releases the lock, and delivers to
//! every observer concurrently. Observers whose delivery fails are pruned
//! in one pass once all deliveries have returned, so a broken observer
//! neither blocks nor rolls back delivery to the others.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::{mpsc, RwLock};

use salespulse_core::notify::{NotificationEvent, Observer, ObserverId};

use super::ChannelObserver;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Observers removed because their delivery failed.
    pub pruned: usize,
}

/// Process-wide observer registry.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone, Default)]
pub struct Broadcaster {
    observers: Arc<RwLock<HashMap<ObserverId, Arc<dyn Observer>>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits an observer and returns its handle.
    pub async fn register(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId::new();
        self.observers.write().await.insert(id, observer);
        tracing::debug!(observer_id = %id, "Observer registered");
        id
    }

    /// Removes an observer. Unknown handles are a no-op.
    ///
    /// Returns true if the observer was registered.
    pub async fn unregister(&self, id: ObserverId) -> bool {
        let removed = self.observers.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(observer_id = %id, "Observer unregistered");
        }
        removed
    }

    /// Number of registered observers.
    pub async fn len(&self) -> usize {
        self.observers.read().await.len()
    }

    /// Delivers `event` to every registered observer.
    ///
    /// Failures are not returned to the caller; they only show up as pruned
    /// observers in the report.
    pub async fn broadcast(&self, event: &NotificationEvent) -> BroadcastReport {
        let targets: Vec<(ObserverId, Arc<dyn Observer>)> = {
            let observers = self.observers.read().await;
            observers
                .iter()
                .map(|(id, observer)| (*id, Arc::clone(observer)))
                .collect()
        };

        if targets.is_empty() {
            return BroadcastReport::default();
        }

        let outcomes = join_all(targets.iter().map(|(id, observer)| async move {
            (*id, observer.deliver(event).await)
        }))
        .await;

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    tracing::warn!(
                        observer_id = %id,
                        event = event.event_type(),
                        error = %err,
                        "Delivery failed, dropping observer"
                    );
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            let mut observers = self.observers.write().await;
            report.pruned = failed
                .iter()
                .filter(|id| observers.remove(*id).is_some())
                .count();
        }

        if event.is_training_terminal() {
            tracing::debug!(
                event = event.event_type(),
                category = event.category().unwrap_or_default(),
                delivered = report.delivered,
                "Training outcome broadcast"
            );
        }
        tracing::trace!(
            event = event.event_type(),
            category = ?event.category(),
            delivered = report.delivered,
            pruned = report.pruned,
            "Broadcast complete"
        );
        report
    }

    /// Delivers `event` to a single observer.
    ///
    /// Returns false if the observer is unknown or its delivery failed, in
    /// which case it is unregistered.
    pub async fn send(&self, id: ObserverId, event: &NotificationEvent) -> bool {
        let Some(observer) = self.observers.read().await.get(&id).cloned() else {
            return false;
        };

        match observer.deliver(event).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(observer_id = %id, error = %err, "Personal delivery failed");
                self.unregister(id).await;
                false
            }
        }
    }

    /// Registers a channel observer with a queue of `capacity` events.
    ///
    /// The observer is unregistered when the returned subscription drops.
    pub async fn subscribe(&self, capacity: usize) -> Subscription {
        let (observer, rx) = ChannelObserver::channel(capacity);
        let id = self.register(Arc::new(observer)).await;
        Subscription {
            id,
            rx,
            broadcaster: self.clone(),
        }
    }
}

/// A registered channel observer and the queue its connection drains.
pub struct Subscription {
    id: ObserverId,
    rx: mpsc::Receiver<NotificationEvent>,
    broadcaster: Broadcaster,
}

impl Subscription {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Waits for the next event; `None` once the observer has been pruned.
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let broadcaster = self.broadcaster.clone();
        let id = self.id;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                broadcaster.unregister(id).await;
            });
        }
    }
}
