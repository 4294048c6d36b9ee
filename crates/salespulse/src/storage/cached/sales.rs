//! Cached sales repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use salespulse_core::cache::{deserialize, monthly_series_key, serialize, Cache};
use salespulse_core::sales::{Aggregate, AggregateQuery, MonthlyPoint, NewSale, Sale};
use salespulse_core::storage::{Result, SalesRepository};

/// Cache-aside decorator over a `SalesRepository`.
///
/// Aggregates and monthly series are cached under `sales:` keys with the
/// configured TTL. `sample` and `insert_sales` are not cached. A value read
/// while an invalidation runs is returned but not cached.
pub struct CachedSalesRepository<R, C>
where
    R: SalesRepository,
    C: Cache + ?Sized,
{
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<R, C> CachedSalesRepository<R, C>
where
    R: SalesRepository,
    C: Cache + ?Sized,
{
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match deserialize(&bytes) {
                Ok(value) => {
                    tracing::trace!(key, "Cache hit");
                    Some(value)
                }
                Err(err) => {
                    tracing::warn!(key, error = %err, "Cache entry deserialization failed");
                    None
                }
            },
            Ok(None) => {
                tracing::trace!(key, "Cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed");
                None
            }
        }
    }

    /// Caches `value` unless the cache was invalidated after `generation`.
    async fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T, generation: u64) {
        match serialize(value) {
            Ok(bytes) => match self
                .cache
                .set_if_generation(key, &bytes, Some(self.ttl), generation)
                .await
            {
                Ok(true) => {}
                Ok(false) => tracing::debug!(key, "Invalidated during read, not caching"),
                Err(err) => tracing::warn!(key, error = %err, "Failed to cache value"),
            },
            Err(err) => tracing::warn!(key, error = %err, "Failed to serialize value for cache"),
        }
    }
}

#[async_trait]
impl<R, C> SalesRepository for CachedSalesRepository<R, C>
where
    R: SalesRepository + 'static,
    C: Cache + ?Sized + 'static,
{
    async fn monthly_series(&self, category: &str) -> Result<Vec<MonthlyPoint>> {
        let key = monthly_series_key(category);
        if let Some(series) = self.cached(&key).await {
            return Ok(series);
        }

        let generation = self.cache.generation();
        let series = self.repository.monthly_series(category).await?;
        self.store(&key, &series, generation).await;
        Ok(series)
    }

    async fn aggregate(&self, query: AggregateQuery) -> Result<Aggregate> {
        let key = query.cache_key();
        if let Some(aggregate) = self.cached(&key).await {
            return Ok(aggregate);
        }

        let generation = self.cache.generation();
        let aggregate = self.repository.aggregate(query).await?;
        self.store(&key, &aggregate, generation).await;
        Ok(aggregate)
    }

    async fn sample(&self, limit: usize) -> Result<Vec<Sale>> {
        self.repository.sample(limit).await
    }

    async fn insert_sales(&self, sales: &[NewSale]) -> Result<usize> {
        self.repository.insert_sales(sales).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::test_support::{monthly_series, GatedRepository, SeriesRepository};
    use salespulse_core::storage::RepositoryError;

    type Cached = CachedSalesRepository<SeriesRepository, MemoryCache>;

    fn setup(repo: SeriesRepository) -> (Cached, Arc<SeriesRepository>, Arc<MemoryCache>) {
        let repo = Arc::new(repo);
        let cache = Arc::new(MemoryCache::new(100));
        let cached =
            CachedSalesRepository::new(repo.clone(), cache.clone(), Duration::from_secs(60));
        (cached, repo, cache)
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let (cached, repo, _cache) =
            setup(SeriesRepository::new().with_series("Books", monthly_series(8)));

        let first = cached.monthly_series("Books").await.unwrap();
        let second = cached.monthly_series("Books").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
        assert_eq!(repo.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidation_forces_recompute() {
        let (cached, repo, cache) =
            setup(SeriesRepository::new().with_series("Books", monthly_series(8)));

        cached.monthly_series("Books").await.unwrap();
        cache.invalidate_pattern("sales:*").await.unwrap();
        cached.monthly_series("Books").await.unwrap();

        assert_eq!(repo.calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_treated_as_miss() {
        let (cached, repo, cache) =
            setup(SeriesRepository::new().with_series("Books", monthly_series(6)));

        cache
            .set(&monthly_series_key("Books"), b"not json", None)
            .await
            .unwrap();

        assert_eq!(cached.monthly_series("Books").await.unwrap().len(), 6);
        assert_eq!(repo.calls(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let (cached, _repo, cache) = setup(SeriesRepository::new());

        let result = cached.aggregate(AggregateQuery::Summary).await;

        assert_eq!(result, Err(RepositoryError::no_sales()));
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_works_behind_trait_object_cache() {
        let repo = Arc::new(SeriesRepository::new().with_series("Toys", monthly_series(7)));
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new(10));
        let cached = CachedSalesRepository::new(repo.clone(), cache, Duration::from_secs(60));

        cached.monthly_series("Toys").await.unwrap();
        cached.monthly_series("Toys").await.unwrap();
        assert_eq!(repo.calls(), 1);
    }

    #[tokio::test]
    async fn test_read_racing_invalidation_is_not_cached() {
        let (repo, entered, release) = GatedRepository::new(
            SeriesRepository::new()
                .with_series("Books", monthly_series(6))
                .with_series("Books", monthly_series(7)),
        );
        let cache = Arc::new(MemoryCache::new(100));
        let cached = Arc::new(CachedSalesRepository::new(
            Arc::new(repo),
            cache.clone(),
            Duration::from_secs(60),
        ));

        let reader = tokio::spawn({
            let cached = cached.clone();
            async move { cached.monthly_series("Books").await }
        });

        // A write commits and invalidates while the old read is in flight.
        entered.await.unwrap();
        cache.invalidate_pattern("sales:*").await.unwrap();
        release.send(()).unwrap();

        assert_eq!(reader.await.unwrap().unwrap().len(), 6);
        assert_eq!(cache.entry_count().await, 0);
        assert_eq!(cached.monthly_series("Books").await.unwrap().len(), 7);
    }
}
