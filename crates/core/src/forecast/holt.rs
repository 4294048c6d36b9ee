//! Holt's linear-trend exponential smoothing.

use chrono::{Months, NaiveDate, Utc};

use crate::sales::MonthlyPoint;

use super::{
    FittedValue, ForecastEngine, ForecastError, ForecastModel, ForecastPoint, Result,
    MIN_SERIES_LEN,
};

const ENGINE_NAME: &str = "holt-linear";

/// z-score of a two-sided 95% interval.
const Z_95: f64 = 1.96;

/// Double exponential smoothing over a level and a trend component.
#[derive(Debug, Clone)]
pub struct HoltLinearEngine {
    alpha: f64,
    beta: f64,
    min_points: usize,
}

impl HoltLinearEngine {
    /// Creates an engine with the given level (`alpha`) and trend (`beta`)
    /// smoothing factors, both in `(0, 1)`.
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(Self {
            alpha,
            beta,
            min_points: MIN_SERIES_LEN,
        })
    }

    /// Overrides the minimum series length. Values below 2 are raised to 2,
    /// the least needed to seed a trend.
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points.max(2);
        self
    }

    fn check_series(&self, series: &[MonthlyPoint]) -> Result<()> {
        if series.len() < self.min_points {
            return Err(ForecastError::InsufficientData {
                points: series.len(),
                required: self.min_points,
            });
        }
        if let Some(bad) = series.iter().find(|p| !p.total_sales.is_finite()) {
            return Err(ForecastError::InvalidSeries(format!(
                "non-finite total for {}",
                bad.month
            )));
        }
        if series.windows(2).any(|w| w[0].month >= w[1].month) {
            return Err(ForecastError::InvalidSeries(
                "months must be strictly increasing".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for HoltLinearEngine {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.3,
            min_points: MIN_SERIES_LEN,
        }
    }
}

impl ForecastEngine for HoltLinearEngine {
    fn fit(&self, series: &[MonthlyPoint]) -> Result<ForecastModel> {
        self.check_series(series)?;
        let series = fill_month_gaps(series)?;

        let mut level = series[0].total_sales;
        let mut trend = series[1].total_sales - series[0].total_sales;
        let mut fitted = Vec::with_capacity(series.len());
        fitted.push(FittedValue {
            month: series[0].month,
            value: level,
        });

        let mut squared_error = 0.0;
        for point in &series[1..] {
            let estimate = level + trend;
            fitted.push(FittedValue {
                month: point.month,
                value: estimate,
            });
            squared_error += (point.total_sales - estimate).powi(2);

            let previous_level = level;
            level = self.alpha * point.total_sales + (1.0 - self.alpha) * estimate;
            trend = self.beta * (level - previous_level) + (1.0 - self.beta) * trend;
        }

        let residual_std = (squared_error / (series.len() - 1) as f64).sqrt();

        Ok(ForecastModel {
            engine: ENGINE_NAME.to_string(),
            alpha: self.alpha,
            beta: self.beta,
            level,
            trend,
            residual_std,
            fitted,
            trained_at: Utc::now(),
        })
    }

    fn predict(&self, model: &ForecastModel, horizon: usize) -> Result<Vec<ForecastPoint>> {
        let last_month = model
            .last_month()
            .ok_or_else(|| ForecastError::InvalidSeries("model has no fitted values".into()))?;

        let band = Z_95 * model.residual_std;
        let mut points = Vec::with_capacity(model.fitted.len() + horizon);

        points.extend(model.fitted.iter().map(|f| ForecastPoint {
            ds: f.month,
            yhat: f.value,
            yhat_lower: f.value - band,
            yhat_upper: f.value + band,
        }));

        for step in 1..=horizon {
            let ds = add_months(last_month, step)?;
            let yhat = model.level + step as f64 * model.trend;
            let width = band * (step as f64).sqrt();
            points.push(ForecastPoint {
                ds,
                yhat,
                yhat_lower: yhat - width,
                yhat_upper: yhat + width,
            });
        }

        Ok(points)
    }
}

/// Inserts a zero total for every month without sales so the smoothing
/// advances exactly one month per step.
fn fill_month_gaps(series: &[MonthlyPoint]) -> Result<Vec<MonthlyPoint>> {
    let mut filled: Vec<MonthlyPoint> = Vec::with_capacity(series.len());
    for point in series {
        if let Some(last) = filled.last().map(|p| p.month) {
            let mut next = add_months(last, 1)?;
            while next < point.month {
                filled.push(MonthlyPoint::new(next, 0.0));
                next = add_months(next, 1)?;
            }
        }
        filled.push(*point);
    }
    Ok(filled)
}

fn add_months(month: NaiveDate, step: usize) -> Result<NaiveDate> {
    u32::try_from(step)
        .ok()
        .and_then(|n| month.checked_add_months(Months::new(n)))
        .ok_or_else(|| ForecastError::InvalidParameter(format!("horizon {step} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, m, 1).unwrap()
    }

    fn linear_series(len: u32, start: f64, step: f64) -> Vec<MonthlyPoint> {
        (0..len)
            .map(|i| {
                let date = month(2022, 1).checked_add_months(Months::new(i)).unwrap();
                MonthlyPoint::new(date, start + step * i as f64)
            })
            .collect()
    }

    #[test]
    fn test_new_rejects_out_of_range_factors() {
        assert!(HoltLinearEngine::new(0.0, 0.3).is_err());
        assert!(HoltLinearEngine::new(0.5, 1.0).is_err());
        assert!(HoltLinearEngine::new(f64::NAN, 0.3).is_err());
        assert!(HoltLinearEngine::new(0.2, 0.8).is_ok());
    }

    #[test]
    fn test_fit_requires_six_points() {
        let engine = HoltLinearEngine::default();
        let result = engine.fit(&linear_series(5, 100.0, 10.0));
        assert_eq!(
            result,
            Err(ForecastError::InsufficientData {
                points: 5,
                required: 6
            })
        );
    }

    #[test]
    fn test_fit_rejects_unordered_months() {
        let mut series = linear_series(6, 100.0, 10.0);
        series.swap(2, 3);
        let result = HoltLinearEngine::default().fit(&series);
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
    }

    #[test]
    fn test_fit_rejects_non_finite_totals() {
        let mut series = linear_series(6, 100.0, 10.0);
        series[4].total_sales = f64::INFINITY;
        let result = HoltLinearEngine::default().fit(&series);
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
    }

    #[test]
    fn test_linear_series_is_tracked_exactly() {
        let engine = HoltLinearEngine::default();
        let model = engine.fit(&linear_series(12, 100.0, 10.0)).unwrap();

        assert_eq!(model.months_trained(), 12);
        assert!(model.residual_std.abs() < 1e-9);
        assert!((model.trend - 10.0).abs() < 1e-9);

        let points = engine.predict(&model, 3).unwrap();
        assert_eq!(points.len(), 15);

        let next = points[12];
        assert_eq!(next.ds, month(2023, 1));
        assert!((next.yhat - 220.0).abs() < 1e-9);
        assert!((points[14].yhat - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_widens_with_horizon() {
        let mut series = linear_series(12, 100.0, 10.0);
        for (i, point) in series.iter_mut().enumerate() {
            point.total_sales += if i % 2 == 0 { 15.0 } else { -15.0 };
        }
        let engine = HoltLinearEngine::default();
        let model = engine.fit(&series).unwrap();
        assert!(model.residual_std > 0.0);

        let points = engine.predict(&model, 6).unwrap();
        let widths: Vec<f64> = points[12..]
            .iter()
            .map(|p| p.yhat_upper - p.yhat_lower)
            .collect();
        assert!(widths.windows(2).all(|w| w[1] > w[0]));
        assert!(points.iter().all(|p| p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper));
    }

    #[test]
    fn test_zero_horizon_returns_in_sample_only() {
        let engine = HoltLinearEngine::default();
        let model = engine.fit(&linear_series(6, 50.0, 1.0)).unwrap();
        let points = engine.predict(&model, 0).unwrap();
        assert_eq!(points.len(), 6);
        assert_eq!(points.last().unwrap().ds, month(2022, 6));
    }

    #[test]
    fn test_future_months_cross_year_boundary() {
        let engine = HoltLinearEngine::default();
        let model = engine.fit(&linear_series(11, 10.0, 2.0)).unwrap();
        let points = engine.predict(&model, 2).unwrap();
        assert_eq!(points[11].ds, month(2022, 12));
        assert_eq!(points[12].ds, month(2023, 1));
    }

    #[test]
    fn test_min_points_override_floor() {
        let engine = HoltLinearEngine::default().with_min_points(0);
        assert!(engine.fit(&linear_series(2, 1.0, 1.0)).is_ok());
        assert!(engine.fit(&linear_series(1, 1.0, 1.0)).is_err());
    }

    #[test]
    fn test_fit_treats_missing_months_as_zero_sales() {
        let engine = HoltLinearEngine::default();
        let complete = linear_series(8, 100.0, 10.0);
        let mut zero_filled = complete.clone();
        zero_filled[3].total_sales = 0.0;
        zero_filled[4].total_sales = 0.0;
        let mut gapped = zero_filled.clone();
        gapped.drain(3..5);

        let from_gaps = engine.fit(&gapped).unwrap();
        let from_zeros = engine.fit(&zero_filled).unwrap();

        assert_eq!(from_gaps.fitted, from_zeros.fitted);
        assert_eq!(from_gaps.level, from_zeros.level);
        assert_eq!(from_gaps.trend, from_zeros.trend);
        assert_eq!(from_gaps.months_trained(), 8);

        let next = engine.predict(&from_gaps, 1).unwrap();
        assert_eq!(next.last().unwrap().ds, month(2022, 9));
    }
}
