//! In-test fakes for the collaborator traits.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use tokio::sync::oneshot;

use salespulse_core::forecast::{
    ForecastEngine, ForecastError, ForecastModel, ForecastPoint, HoltLinearEngine,
};
use salespulse_core::model_store::{ModelStore, ModelStoreError};
use salespulse_core::sales::{Aggregate, AggregateQuery, MonthlyPoint, NewSale, Sale};
use salespulse_core::storage::{RepositoryError, Result as RepoResult, SalesRepository};

/// `len` consecutive months starting January 2023 with a linear trend.
pub fn monthly_series(len: u32) -> Vec<MonthlyPoint> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..len)
        .map(|i| {
            let month = start.checked_add_months(Months::new(i)).unwrap();
            MonthlyPoint::new(month, 1000.0 + 25.0 * i as f64)
        })
        .collect()
}

/// Repository serving canned monthly series.
///
/// Each category answers from a queue of series; the last one repeats once
/// the queue is drained.
#[derive(Default)]
pub struct SeriesRepository {
    series: Mutex<HashMap<String, VecDeque<Vec<MonthlyPoint>>>>,
    calls: AtomicUsize,
    fail: bool,
}

impl SeriesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_series(self, category: &str, series: Vec<MonthlyPoint>) -> Self {
        self.series
            .lock()
            .unwrap()
            .entry(category.to_string())
            .or_default()
            .push_back(series);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SalesRepository for SeriesRepository {
    async fn monthly_series(&self, category: &str) -> RepoResult<Vec<MonthlyPoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RepositoryError::ConnectionFailed("database is locked".into()));
        }
        let mut series = self.series.lock().unwrap();
        let Some(queue) = series.get_mut(category) else {
            return Ok(Vec::new());
        };
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            Ok(queue.front().cloned().unwrap_or_default())
        }
    }

    async fn aggregate(&self, _query: AggregateQuery) -> RepoResult<Aggregate> {
        Err(RepositoryError::no_sales())
    }

    async fn sample(&self, _limit: usize) -> RepoResult<Vec<Sale>> {
        Ok(Vec::new())
    }

    async fn insert_sales(&self, sales: &[NewSale]) -> RepoResult<usize> {
        Ok(sales.len())
    }
}

/// Repository whose first `monthly_series` call reads its answer, then
/// parks until released.
///
/// Lets a test change the world between a read and the caller caching it.
pub struct GatedRepository {
    inner: SeriesRepository,
    gate: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
}

impl GatedRepository {
    /// Returns the repository, a receiver that fires once the first read is
    /// parked, and the sender that releases it.
    pub fn new(inner: SeriesRepository) -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let repository = Self {
            inner,
            gate: Mutex::new(Some((entered_tx, release_rx))),
        };
        (repository, entered_rx, release_tx)
    }
}

#[async_trait]
impl SalesRepository for GatedRepository {
    async fn monthly_series(&self, category: &str) -> RepoResult<Vec<MonthlyPoint>> {
        let series = self.inner.monthly_series(category).await;
        let gate = self.gate.lock().unwrap().take();
        if let Some((entered, release)) = gate {
            let _ = entered.send(());
            let _ = release.await;
        }
        series
    }

    async fn aggregate(&self, query: AggregateQuery) -> RepoResult<Aggregate> {
        self.inner.aggregate(query).await
    }

    async fn sample(&self, limit: usize) -> RepoResult<Vec<Sale>> {
        self.inner.sample(limit).await
    }

    async fn insert_sales(&self, sales: &[NewSale]) -> RepoResult<usize> {
        self.inner.insert_sales(sales).await
    }
}

/// Wraps the Holt engine with an optional delay and failure.
#[derive(Default)]
pub struct TestEngine {
    inner: HoltLinearEngine,
    delay: Option<Duration>,
    fail_with: Option<String>,
    fits: AtomicUsize,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn fits(&self) -> usize {
        self.fits.load(Ordering::SeqCst)
    }
}

impl ForecastEngine for TestEngine {
    fn fit(&self, series: &[MonthlyPoint]) -> Result<ForecastModel, ForecastError> {
        self.fits.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(message) = &self.fail_with {
            return Err(ForecastError::InvalidSeries(message.clone()));
        }
        self.inner.fit(series)
    }

    fn predict(
        &self,
        model: &ForecastModel,
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        self.inner.predict(model, horizon)
    }
}

/// Model store holding blobs in memory.
#[derive(Default)]
pub struct MemoryModelStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    saves: AtomicUsize,
    fail: bool,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn put(&self, category: &str, blob: Vec<u8>) {
        self.blobs.lock().unwrap().insert(category.to_string(), blob);
    }
}

#[async_trait]
impl ModelStore for MemoryModelStore {
    async fn save(&self, category: &str, blob: &[u8]) -> Result<(), ModelStoreError> {
        if self.fail {
            return Err(ModelStoreError::Backend("disk full".into()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.put(category, blob.to_vec());
        Ok(())
    }

    async fn load(&self, category: &str) -> Result<Option<Vec<u8>>, ModelStoreError> {
        Ok(self.blobs.lock().unwrap().get(category).cloned())
    }

    fn location(&self, category: &str) -> String {
        format!("memory://{category}")
    }
}
