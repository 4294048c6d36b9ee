//! In-memory aggregate cache with TTL expiry and LRU eviction.
//!
//! Expired entries are deleted lazily on read. An optional sweeper task
//! purges them proactively to bound memory between reads.
//!
//! Every invalidation bumps a generation counter while holding the store
//! lock. Conditional writes compare against it under the same lock, so a
//! value computed before an invalidation cannot land after it.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use salespulse_core::cache::{pattern_matches, Cache, Result, DEFAULT_TTL};

/// A single cache entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Valid while `now - created_at < ttl`; a zero TTL is never valid.
    fn is_valid(&self) -> bool {
        self.created_at.elapsed() < self.ttl
    }
}

/// In-memory cache implementation with TTL and LRU eviction.
///
/// Cheap to clone; clones share the same store. `get` takes the write lock
/// because an LRU lookup updates recency and may delete an expired entry.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    generation: Arc<AtomicU64>,
    default_ttl: Duration,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` entries (at least one).
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            generation: Arc::new(AtomicU64::new(0)),
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Overrides the TTL used when `set` is called without one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Removes every expired entry, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut store = self.store.write().await;
        let expired: Vec<String> = store
            .iter()
            .filter(|(_, entry)| !entry.is_valid())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            store.pop(key);
        }
        expired.len()
    }

    /// Spawns a task that purges expired entries every `interval` until
    /// `shutdown` fires.
    pub fn spawn_sweeper(
        &self,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let purged = cache.purge_expired().await;
                        if purged > 0 {
                            tracing::debug!(purged, "Swept expired cache entries");
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("Cache sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;

        match store.get(key) {
            Some(entry) if entry.is_valid() => Ok(Some(entry.value.clone())),
            Some(_) => {
                store.pop(key);
                tracing::trace!(key, "Evicted expired cache entry");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry::new(value.to_vec(), ttl.unwrap_or(self.default_ttl));
        let mut store = self.store.write().await;
        store.put(key.to_string(), entry);
        Ok(())
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn set_if_generation(
        &self,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
        generation: u64,
    ) -> Result<bool> {
        let mut store = self.store.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::trace!(key, "Skipped write from before an invalidation");
            return Ok(false);
        }
        let entry = CacheEntry::new(value.to_vec(), ttl.unwrap_or(self.default_ttl));
        store.put(key.to_string(), entry);
        Ok(true)
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        store.pop(key);
        Ok(())
    }

    async fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        let mut store = self.store.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        let keys_to_delete: Vec<String> = store
            .iter()
            .filter(|(key, _)| pattern_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys_to_delete {
            store.pop(key);
        }
        Ok(keys_to_delete.len())
    }

    async fn invalidate_all(&self) -> Result<()> {
        let mut store = self.store.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        store.clear();
        Ok(())
    }

    async fn entry_count(&self) -> usize {
        self.store.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salespulse_core::cache::{aggregate_key, forecast_key, static_key};

    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache
            .set("summary", br#"{"total":100}"#, Some(Duration::from_secs(60)))
            .await
            .unwrap();

        let result = cache.get("summary").await.unwrap();
        assert_eq!(result, Some(br#"{"total":100}"#.to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert_eq!(cache.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiration_evicts_on_read() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache
            .set("short", b"short-lived", Some(Duration::from_millis(50)))
            .await
            .unwrap();

        assert!(cache.get("short").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get("short").await.unwrap().is_none());
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_valid() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("zero", b"value", Some(Duration::ZERO)).await.unwrap();
        assert!(cache.get("zero").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_default_ttl_applies_when_none_given() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES).with_default_ttl(Duration::from_millis(30));
        cache.set("key", b"value", None).await.unwrap();
        assert!(cache.get("key").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_resets_value_and_ttl() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache
            .set("key", b"first", Some(Duration::from_millis(40)))
            .await
            .unwrap();
        cache
            .set("key", b"second", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("key").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("key", b"value", None).await.unwrap();
        cache.invalidate("key").await.unwrap();
        assert!(cache.get("key").await.unwrap().is_none());

        // Unknown keys are fine.
        cache.invalidate("key").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidate_pattern_counts_removed() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set(&aggregate_key("summary"), b"1", None).await.unwrap();
        cache.set(&aggregate_key("categories"), b"2", None).await.unwrap();
        cache.set(&forecast_key("Books", 3), b"3", None).await.unwrap();
        cache.set(&static_key("version"), b"4", None).await.unwrap();

        let removed = cache.invalidate_pattern("sales:*").await.unwrap();
        assert_eq!(removed, 2);

        assert!(cache.get(&aggregate_key("summary")).await.unwrap().is_none());
        assert!(cache.get(&forecast_key("Books", 3)).await.unwrap().is_some());
        assert!(cache.get(&static_key("version")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("a", b"1", Some(Duration::from_secs(3600))).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();

        cache.invalidate_all().await.unwrap();

        assert!(cache.get("a").await.unwrap().is_none());
        assert!(cache.get("b").await.unwrap().is_none());
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("stale", b"1", Some(Duration::ZERO)).await.unwrap();
        cache.set("fresh", b"2", None).await.unwrap();

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_purges_and_stops_on_shutdown() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("stale", b"1", Some(Duration::ZERO)).await.unwrap();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = cache.spawn_sweeper(Duration::from_millis(20), shutdown_rx);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.entry_count().await, 0);

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(3);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.set("key2", b"value2", None).await.unwrap();
        cache.set("key3", b"value3", None).await.unwrap();

        // Touch key1 so key2 becomes least recently used.
        cache.get("key1").await.unwrap();
        cache.set("key4", b"value4", None).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_some());
        assert!(cache.get("key2").await.unwrap().is_none());
        assert!(cache.get("key3").await.unwrap().is_some());
        assert!(cache.get("key4").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one_entry() {
        let cache = MemoryCache::new(0);
        cache.set("a", b"1", None).await.unwrap();
        cache.set("b", b"2", None).await.unwrap();
        assert_eq!(cache.entry_count().await, 1);
        assert!(cache.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_sets_last_writer_wins() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let mut handles = Vec::new();
        for i in 0..16u8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.set("shared", &[i], None).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let value = cache.get("shared").await.unwrap().unwrap();
        assert_eq!(value.len(), 1);
        assert!(value[0] < 16);
    }

    #[tokio::test]
    async fn test_set_if_generation_stores_when_unchanged() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let generation = cache.generation();

        let stored = cache
            .set_if_generation("key", b"value", None, generation)
            .await
            .unwrap();

        assert!(stored);
        assert_eq!(cache.get("key").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_set_if_generation_skips_after_any_invalidation() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        let generation = cache.generation();
        cache.invalidate_pattern("sales:*").await.unwrap();
        assert!(!cache
            .set_if_generation("sales:summary", b"stale", None, generation)
            .await
            .unwrap());

        let generation = cache.generation();
        cache.invalidate("other").await.unwrap();
        assert!(!cache
            .set_if_generation("sales:summary", b"stale", None, generation)
            .await
            .unwrap());

        let generation = cache.generation();
        cache.invalidate_all().await.unwrap();
        assert!(!cache
            .set_if_generation("sales:summary", b"stale", None, generation)
            .await
            .unwrap());

        assert!(cache.get("sales:summary").await.unwrap().is_none());
    }
}
