use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// TTL applied when a caller does not pass one explicitly.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Key/value cache for precomputed aggregate results.
///
/// An entry is valid while `now - created_at < ttl`. Expired entries are
/// logically absent; a zero TTL produces an entry that is never valid.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the value for `key` if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Inserts or replaces `key`, resetting its creation time.
    ///
    /// `None` applies the cache's default TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Counter bumped by every invalidation.
    ///
    /// Capture it before computing a value from the source of truth and
    /// store the value with [`Cache::set_if_generation`].
    fn generation(&self) -> u64;

    /// Like [`Cache::set`], but only if no invalidation happened since
    /// `generation` was read. Returns whether the value was stored.
    async fn set_if_generation(
        &self,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
        generation: u64,
    ) -> Result<bool>;

    /// Removes `key` regardless of remaining TTL.
    async fn invalidate(&self, key: &str) -> Result<()>;

    /// Removes every key matching a glob pattern (e.g. `"sales:*"`).
    ///
    /// Returns the number of removed entries.
    async fn invalidate_pattern(&self, pattern: &str) -> Result<usize>;

    /// Removes every key.
    async fn invalidate_all(&self) -> Result<()>;

    /// Number of entries currently held, expired ones included.
    async fn entry_count(&self) -> usize;
}
