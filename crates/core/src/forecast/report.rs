//! Forecast output joined with observed values.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ForecastPoint;
use crate::sales::MonthlyPoint;

/// Column order of [`ForecastRow`] as rendered by charting clients.
pub const FORECAST_COLUMNS: [&str; 5] = ["ds", "actual", "yhat", "yhat_lower", "yhat_upper"];

/// One month of forecast output. `actual` is `None` for future months.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub actual: Option<f64>,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Forecast for one category and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub category: String,
    pub horizon: u32,
    pub series: Vec<ForecastRow>,
    pub columns: Vec<String>,
}

impl ForecastReport {
    pub fn new(category: impl Into<String>, horizon: u32, series: Vec<ForecastRow>) -> Self {
        Self {
            category: category.into(),
            horizon,
            series,
            columns: FORECAST_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Attaches observed totals to forecast points by month.
pub fn join_actuals(points: &[ForecastPoint], actuals: &[MonthlyPoint]) -> Vec<ForecastRow> {
    let observed: HashMap<NaiveDate, f64> = actuals
        .iter()
        .map(|p| (p.month, p.total_sales))
        .collect();

    points
        .iter()
        .map(|p| ForecastRow {
            ds: p.ds,
            actual: observed.get(&p.ds).copied(),
            yhat: p.yhat,
            yhat_lower: p.yhat_lower,
            yhat_upper: p.yhat_upper,
        })
        .collect()
}
