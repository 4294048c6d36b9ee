use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fewest monthly points a model may be trained on.
pub const MIN_SERIES_LEN: usize = 6;

/// A trained forecast model.
///
/// Opaque to everything except the engine that produced it; the rest of the
/// system only moves it around as an encoded blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastModel {
    pub engine: String,
    pub alpha: f64,
    pub beta: f64,
    /// Smoothed level after the last observation.
    pub level: f64,
    /// Smoothed per-month trend after the last observation.
    pub trend: f64,
    /// Standard deviation of the one-step-ahead residuals.
    pub residual_std: f64,
    /// One-step-ahead fitted values over the training series.
    pub fitted: Vec<FittedValue>,
    pub trained_at: DateTime<Utc>,
}

impl ForecastModel {
    /// Number of monthly points the model was trained on.
    pub fn months_trained(&self) -> usize {
        self.fitted.len()
    }

    /// Last month of the training series.
    pub fn last_month(&self) -> Option<NaiveDate> {
        self.fitted.last().map(|f| f.month)
    }
}

/// In-sample fitted value for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedValue {
    pub month: NaiveDate,
    pub value: f64,
}

/// A point estimate with its uncertainty band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}
