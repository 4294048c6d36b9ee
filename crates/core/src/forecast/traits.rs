use crate::sales::MonthlyPoint;

use super::{ForecastModel, ForecastPoint, Result};

/// A time-series forecasting algorithm.
///
/// Both operations are CPU-bound and synchronous; async callers run them on
/// a blocking thread.
pub trait ForecastEngine: Send + Sync {
    /// Trains a model on a monthly series ordered by month.
    ///
    /// Fails with `InsufficientData` when the series is too short.
    fn fit(&self, series: &[MonthlyPoint]) -> Result<ForecastModel>;

    /// Returns in-sample estimates followed by `horizon` future months.
    fn predict(&self, model: &ForecastModel, horizon: usize) -> Result<Vec<ForecastPoint>>;
}
