//! Training coordinator.
//!
//! Each category moves `Idle -> Queued -> Running -> {Succeeded, Failed}`
//! and back to `Idle` once the terminal event has been broadcast. A category
//! with an active job cannot get a second one, so at most one training
//! writes a category's model at a time. Jobs of one category also take turns
//! on a per-category lane, which keeps their lifecycle events from
//! interleaving without blocking other categories.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use salespulse_core::forecast::{encode_model, ForecastEngine, ForecastError, MIN_SERIES_LEN};
use salespulse_core::model_store::ModelStore;
use salespulse_core::notify::NotificationEvent;
use salespulse_core::sales::validate_category;
use salespulse_core::storage::SalesRepository;
use salespulse_core::training::{Result, TrainingError, TrainingJob, TrainingTicket};

use crate::notify::Broadcaster;

/// A job plus the id that tells it apart from a later job of the same
/// category.
struct TrackedJob {
    id: u64,
    job: TrainingJob,
}

struct Inner {
    repository: Arc<dyn SalesRepository>,
    engine: Arc<dyn ForecastEngine>,
    store: Arc<dyn ModelStore>,
    broadcaster: Broadcaster,
    jobs: Mutex<HashMap<String, TrackedJob>>,
    lanes: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    next_id: AtomicU64,
    timeout: Option<Duration>,
    min_months: usize,
}

/// Runs model training as background tasks and reports progress through the
/// broadcaster. Cheap to clone.
#[derive(Clone)]
pub struct TrainingCoordinator {
    inner: Arc<Inner>,
}

impl TrainingCoordinator {
    pub fn new(
        repository: Arc<dyn SalesRepository>,
        engine: Arc<dyn ForecastEngine>,
        store: Arc<dyn ModelStore>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self::with_timeout(repository, engine, store, broadcaster, None)
    }

    /// Like [`TrainingCoordinator::new`], failing jobs whose fit exceeds
    /// `timeout`.
    pub fn with_timeout(
        repository: Arc<dyn SalesRepository>,
        engine: Arc<dyn ForecastEngine>,
        store: Arc<dyn ModelStore>,
        broadcaster: Broadcaster,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                repository,
                engine,
                store,
                broadcaster,
                jobs: Mutex::new(HashMap::new()),
                lanes: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                timeout,
                min_months: MIN_SERIES_LEN,
            }),
        }
    }

    /// Requests a (re)training of `category`.
    ///
    /// Fails synchronously, without emitting events, when the category is
    /// malformed or has fewer than six months of data. If a job for the
    /// category is already queued or running the request joins it.
    /// Otherwise a job is queued and this returns without waiting for it.
    pub async fn request_training(&self, category: &str) -> Result<TrainingTicket> {
        validate_category(category)?;

        let months = self.load_series_len(category).await?;
        if months < self.inner.min_months {
            return Err(TrainingError::InsufficientData {
                category: category.to_string(),
                months,
                required: self.inner.min_months,
            });
        }

        let mut jobs = self.inner.jobs.lock().await;
        match jobs.get(category) {
            Some(tracked) if tracked.job.state.is_active() => {
                tracing::debug!(%category, state = ?tracked.job.state, "Training already in flight");
                return Ok(TrainingTicket {
                    category: category.to_string(),
                    accepted: true,
                    deduplicated: true,
                    state: tracked.job.state,
                });
            }
            Some(tracked) if tracked.job.state.is_terminal() => {
                tracing::debug!(%category, "Previous job still reporting, new job follows it");
            }
            _ => {}
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let job = TrainingJob::queued(category);
        let state = job.state;
        jobs.insert(category.to_string(), TrackedJob { id, job });
        drop(jobs);

        tracing::info!(%category, months, "Training queued");
        tokio::spawn(self.clone().run_job(category.to_string(), id));

        Ok(TrainingTicket {
            category: category.to_string(),
            accepted: true,
            deduplicated: false,
            state,
        })
    }

    /// Current job for `category`, `None` when idle.
    pub async fn status(&self, category: &str) -> Option<TrainingJob> {
        self.inner
            .jobs
            .lock()
            .await
            .get(category)
            .map(|tracked| tracked.job.clone())
    }

    /// Snapshot of every tracked job.
    pub async fn active_jobs(&self) -> Vec<TrainingJob> {
        self.inner
            .jobs
            .lock()
            .await
            .values()
            .map(|tracked| tracked.job.clone())
            .collect()
    }

    async fn load_series_len(&self, category: &str) -> Result<usize> {
        self.inner
            .repository
            .monthly_series(category)
            .await
            .map(|series| series.len())
            .map_err(|err| TrainingError::Upstream(err.to_string()))
    }

    async fn lane(&self, category: &str) -> Arc<Mutex<()>> {
        self.inner
            .lanes
            .lock()
            .await
            .entry(category.to_string())
            .or_default()
            .clone()
    }

    /// Applies `update` to job `id` if it is still the tracked job.
    async fn update_job(&self, category: &str, id: u64, update: impl FnOnce(&mut TrainingJob)) {
        let mut jobs = self.inner.jobs.lock().await;
        if let Some(tracked) = jobs.get_mut(category).filter(|tracked| tracked.id == id) {
            update(&mut tracked.job);
        }
    }

    async fn run_job(self, category: String, id: u64) {
        let lane = self.lane(&category).await;
        let _turn = lane.lock().await;

        self.update_job(&category, id, TrainingJob::mark_running).await;
        self.inner
            .broadcaster
            .broadcast(&NotificationEvent::TrainingStarted {
                category: category.clone(),
            })
            .await;
        tracing::debug!(%category, "Training started");

        let outcome = self.train(&category).await;

        let event = match &outcome {
            Ok(months_trained) => {
                tracing::info!(%category, months_trained, "Training completed");
                NotificationEvent::TrainingCompleted {
                    category: category.clone(),
                    months_trained: *months_trained,
                }
            }
            Err(err) => {
                tracing::error!(%category, error = %err, "Training failed");
                NotificationEvent::TrainingFailed {
                    category: category.clone(),
                    error: err.event_message(),
                }
            }
        };

        self.update_job(&category, id, |job| match &outcome {
            Ok(months_trained) => job.mark_succeeded(*months_trained),
            Err(err) => job.mark_failed(err.to_string()),
        })
        .await;
        self.inner.broadcaster.broadcast(&event).await;

        let mut jobs = self.inner.jobs.lock().await;
        if jobs.get(&category).is_some_and(|tracked| tracked.id == id) {
            jobs.remove(&category);
        }
    }

    /// Loads a fresh series, fits it off the async runtime and persists the
    /// model. Returns the number of months trained on.
    async fn train(&self, category: &str) -> Result<usize> {
        let series = self
            .inner
            .repository
            .monthly_series(category)
            .await
            .map_err(|err| TrainingError::Upstream(err.to_string()))?;

        if series.len() < self.inner.min_months {
            return Err(TrainingError::InsufficientData {
                category: category.to_string(),
                months: series.len(),
                required: self.inner.min_months,
            });
        }

        let engine = Arc::clone(&self.inner.engine);
        let fit = tokio::task::spawn_blocking(move || engine.fit(&series));
        let joined = match self.inner.timeout {
            Some(limit) => tokio::time::timeout(limit, fit)
                .await
                .map_err(|_| TrainingError::Timeout(limit))?,
            None => fit.await,
        };

        let model = joined
            .map_err(|err| TrainingError::Upstream(format!("training task aborted: {err}")))?
            .map_err(|err| match err {
                ForecastError::InsufficientData { points, required } => {
                    TrainingError::InsufficientData {
                        category: category.to_string(),
                        months: points,
                        required,
                    }
                }
                other => TrainingError::Upstream(other.to_string()),
            })?;

        let blob = encode_model(&model).map_err(|err| TrainingError::Persistence(err.to_string()))?;
        self.inner
            .store
            .save(category, &blob)
            .await
            .map_err(|err| TrainingError::Persistence(err.to_string()))?;

        tracing::debug!(
            %category,
            location = %self.inner.store.location(category),
            "Model persisted"
        );
        Ok(model.months_trained())
    }
}
