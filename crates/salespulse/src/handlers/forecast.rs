use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use salespulse_core::forecast::{ForecastReport, DEFAULT_HORIZON};
use salespulse_core::sales::ALL_CATEGORIES;

use crate::handlers::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    pub category: Option<String>,
    pub horizon: Option<u32>,
}

/// GET /api/predict?category=&horizon= - Forecast joined with actuals.
pub async fn predict(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<ForecastReport>, AppError> {
    let category = query.category.as_deref().unwrap_or(ALL_CATEGORIES);
    let horizon = query.horizon.unwrap_or(DEFAULT_HORIZON);
    Ok(Json(state.forecast.predict(category, horizon).await?))
}
