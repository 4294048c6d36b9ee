//! Shared application state.
//!
//! Every component is built once here and handed to the request handlers
//! by cloning. Background tasks (change bridge, cache sweeper) are spawned
//! on construction and stop when the shutdown signal fires.

use std::sync::Arc;

use tokio::sync::broadcast;

use salespulse_core::cache::Cache;
use salespulse_core::forecast::{ForecastEngine, HoltLinearEngine};
use salespulse_core::model_store::ModelStore;
use salespulse_core::storage::SalesRepository;

use crate::bridge::ChangeBridge;
use crate::cache::MemoryCache;
use crate::config::Config;
use crate::forecast::ForecastService;
use crate::model_store::FsModelStore;
use crate::notify::Broadcaster;
use crate::storage::{CachedSalesRepository, SqliteRepository};
use crate::training::TrainingCoordinator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Aggregate cache, also fronting forecasts.
    pub cache: MemoryCache,
    /// Sales repository behind the cache-aside decorator.
    pub repository: Arc<dyn SalesRepository>,
    /// Uncached database handle, used for seeding and row counts.
    pub database: Arc<SqliteRepository>,
    pub broadcaster: Broadcaster,
    pub coordinator: TrainingCoordinator,
    pub forecast: Arc<ForecastService>,
    /// Outbound queue capacity for each connected observer.
    pub observer_buffer: usize,
    /// Shutdown signal sender for streaming connections and background tasks.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Opens the SQLite database and model directory named in `config`.
    pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
        let database = SqliteRepository::new(&config.sqlite_path).await?;
        let store = Arc::new(FsModelStore::new(&config.models_dir));
        Self::build(database, store, config).await
    }

    async fn build(
        database: SqliteRepository,
        store: Arc<dyn ModelStore>,
        config: &Config,
    ) -> Result<Self, anyhow::Error> {
        let (shutdown_tx, _) = broadcast::channel(1);

        let cache = MemoryCache::new(config.cache_max_entries).with_default_ttl(config.cache_ttl());
        let shared_cache: Arc<dyn Cache> = Arc::new(cache.clone());
        let broadcaster = Broadcaster::new();

        let (notifier, bridge) = ChangeBridge::new(
            shared_cache.clone(),
            broadcaster.clone(),
            config.change_debounce(),
        );
        let database = Arc::new(database.with_change_notifier(notifier).await?);

        let repository: Arc<dyn SalesRepository> = Arc::new(CachedSalesRepository::new(
            database.clone(),
            shared_cache.clone(),
            config.cache_ttl(),
        ));

        let engine: Arc<dyn ForecastEngine> = Arc::new(HoltLinearEngine::default());
        let coordinator = TrainingCoordinator::with_timeout(
            repository.clone(),
            engine.clone(),
            store.clone(),
            broadcaster.clone(),
            config.training_timeout(),
        );
        let forecast = Arc::new(ForecastService::new(
            repository.clone(),
            shared_cache,
            store,
            engine,
            coordinator.clone(),
            config.cache_ttl(),
        ));

        tokio::spawn(bridge.run(shutdown_tx.subscribe()));
        if let Some(interval) = config.cache_sweep_interval() {
            cache.spawn_sweeper(interval, shutdown_tx.subscribe());
        }

        Ok(Self {
            cache,
            repository,
            database,
            broadcaster,
            coordinator,
            forecast,
            observer_buffer: config.observer_buffer,
            shutdown_tx,
        })
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal streaming connections and background tasks to shut down.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

#[cfg(test)]
impl AppState {
    /// State over an in-memory database with models under `models_dir`.
    ///
    /// Change signals are applied without a debounce window.
    pub async fn in_memory(models_dir: &std::path::Path) -> Self {
        let config = Config {
            cache_ttl_seconds: 300,
            cache_max_entries: 1_000,
            cache_sweep_seconds: 0,
            sqlite_path: ":memory:".to_string(),
            models_dir: models_dir.display().to_string(),
            change_debounce_ms: 0,
            training_timeout_seconds: 0,
            observer_buffer: 16,
        };
        let database = SqliteRepository::new_in_memory().await.unwrap();
        let store = Arc::new(FsModelStore::new(models_dir));
        Self::build(database, store, &config).await.unwrap()
    }
}
