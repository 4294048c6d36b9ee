use async_trait::async_trait;

use crate::sales::{Aggregate, AggregateQuery, MonthlyPoint, NewSale, Sale};

use super::Result;

/// Read/write access to the sales store.
///
/// Implementations are assumed consistent as of each call; nothing here
/// spans multiple calls.
#[async_trait]
pub trait SalesRepository: Send + Sync {
    /// Monthly sales totals for a category, ordered by month.
    ///
    /// `"All"` selects every category. An unknown category yields an empty
    /// series, not an error.
    async fn monthly_series(&self, category: &str) -> Result<Vec<MonthlyPoint>>;

    /// Runs an aggregate query over every stored sale.
    ///
    /// Fails with `NotFound` when the store holds no sales.
    async fn aggregate(&self, query: AggregateQuery) -> Result<Aggregate>;

    /// Returns the first `limit` sales.
    async fn sample(&self, limit: usize) -> Result<Vec<Sale>>;

    /// Persists a batch of sales, returning how many rows were written.
    async fn insert_sales(&self, sales: &[NewSale]) -> Result<usize>;
}
