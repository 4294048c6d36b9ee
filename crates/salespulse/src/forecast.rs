//! Forecast serving.
//!
//! Predictions come from the persisted model when one exists. Otherwise a
//! model is fitted in memory for this request and persistence is left to
//! the training coordinator, so the model store keeps a single writer per
//! category.

use std::sync::Arc;
use std::time::Duration;

use salespulse_core::cache::{deserialize, forecast_key, serialize, Cache};
use salespulse_core::forecast::{
    decode_model, join_actuals, validate_horizon, ForecastEngine, ForecastModel, ForecastReport,
    ForecastServiceError, MIN_SERIES_LEN,
};
use salespulse_core::model_store::ModelStore;
use salespulse_core::sales::{validate_category, MonthlyPoint};
use salespulse_core::storage::SalesRepository;

use crate::training::TrainingCoordinator;

type Result<T> = std::result::Result<T, ForecastServiceError>;

pub struct ForecastService {
    repository: Arc<dyn SalesRepository>,
    cache: Arc<dyn Cache>,
    store: Arc<dyn ModelStore>,
    engine: Arc<dyn ForecastEngine>,
    coordinator: TrainingCoordinator,
    ttl: Duration,
}

impl ForecastService {
    pub fn new(
        repository: Arc<dyn SalesRepository>,
        cache: Arc<dyn Cache>,
        store: Arc<dyn ModelStore>,
        engine: Arc<dyn ForecastEngine>,
        coordinator: TrainingCoordinator,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            store,
            engine,
            coordinator,
            ttl,
        }
    }

    /// Forecasts `horizon` months past the end of `category`'s series.
    pub async fn predict(&self, category: &str, horizon: u32) -> Result<ForecastReport> {
        validate_category(category)?;
        let horizon = validate_horizon(horizon)?;

        let key = forecast_key(category, horizon);
        if let Ok(Some(bytes)) = self.cache.get(&key).await {
            match deserialize::<ForecastReport>(&bytes) {
                Ok(report) => {
                    tracing::trace!(%category, horizon, "Forecast cache hit");
                    return Ok(report);
                }
                Err(err) => tracing::warn!(%category, error = %err, "Cached forecast unreadable"),
            }
        }

        let generation = self.cache.generation();
        let series = self.repository.monthly_series(category).await?;
        if series.is_empty() {
            return Err(ForecastServiceError::NotFound(category.to_string()));
        }

        let model = match self.load_model(category).await {
            Some(model) => model,
            None => self.fit_transient(category, &series).await?,
        };

        let steps = usize::try_from(horizon).unwrap_or(usize::MAX);
        let points = self
            .engine
            .predict(&model, steps)
            .map_err(|err| ForecastServiceError::Engine(err.to_string()))?;

        let report = ForecastReport::new(category, horizon, join_actuals(&points, &series));

        match serialize(&report) {
            Ok(bytes) => match self
                .cache
                .set_if_generation(&key, &bytes, Some(self.ttl), generation)
                .await
            {
                Ok(true) => {}
                Ok(false) => tracing::debug!(%category, "Data changed during forecast, not caching"),
                Err(err) => tracing::warn!(%category, error = %err, "Failed to cache forecast"),
            },
            Err(err) => tracing::warn!(%category, error = %err, "Failed to serialize forecast"),
        }

        Ok(report)
    }

    /// Loads the persisted model; unreadable models count as missing.
    async fn load_model(&self, category: &str) -> Option<ForecastModel> {
        let bytes = match self.store.load(category).await {
            Ok(bytes) => bytes?,
            Err(err) => {
                tracing::warn!(%category, error = %err, "Failed to load model");
                return None;
            }
        };

        match decode_model(&bytes) {
            Ok(model) => Some(model),
            Err(err) => {
                tracing::warn!(
                    %category,
                    location = %self.store.location(category),
                    error = %err,
                    "Stored model unreadable, refitting"
                );
                None
            }
        }
    }

    /// Fits a model for this request only and asks the coordinator to
    /// train and persist one in the background.
    async fn fit_transient(
        &self,
        category: &str,
        series: &[MonthlyPoint],
    ) -> Result<ForecastModel> {
        if series.len() < MIN_SERIES_LEN {
            return Err(ForecastServiceError::InsufficientData {
                category: category.to_string(),
                months: series.len(),
                required: MIN_SERIES_LEN,
            });
        }

        let engine = Arc::clone(&self.engine);
        let owned = series.to_vec();
        let model = tokio::task::spawn_blocking(move || engine.fit(&owned))
            .await
            .map_err(|err| ForecastServiceError::Engine(format!("fit task aborted: {err}")))?
            .map_err(|err| ForecastServiceError::Engine(err.to_string()))?;

        match self.coordinator.request_training(category).await {
            Ok(ticket) => tracing::debug!(
                %category,
                deduplicated = ticket.deduplicated,
                "Requested model persistence"
            ),
            Err(err) => tracing::warn!(%category, error = %err, "Could not schedule training"),
        }

        Ok(model)
    }
}
