use async_trait::async_trait;

use super::Result;

/// Persists one opaque model blob per category, last write wins.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Stores `blob` for `category`, replacing any previous model.
    async fn save(&self, category: &str, blob: &[u8]) -> Result<()>;

    /// Loads the model for `category`; `Ok(None)` when none was saved.
    async fn load(&self, category: &str) -> Result<Option<Vec<u8>>>;

    /// Human-readable location of the model for `category`, for logs.
    fn location(&self, category: &str) -> String;
}
