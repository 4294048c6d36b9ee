//! Dashboard aggregate endpoints.
//!
//! Every read goes through the cached repository, so repeated dashboard
//! refreshes are served from memory until the next data change.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use salespulse_core::cache::Cache;
use salespulse_core::sales::{
    Aggregate, AggregateQuery, BreakdownRow, Sale, SalesSummary, ALL_CATEGORIES,
};
use salespulse_core::storage::RepositoryError;

use crate::handlers::AppError;
use crate::state::AppState;

const DEFAULT_SAMPLE: usize = 10;
const MAX_SAMPLE: usize = 1_000;

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

impl CategoryQuery {
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(ALL_CATEGORIES)
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TimeseriesPoint {
    pub ds: NaiveDate,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct TimeseriesResponse {
    pub category: String,
    pub data: Vec<TimeseriesPoint>,
}

/// GET /api/data - First rows of the sales table.
pub async fn data(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Vec<Sale>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_SAMPLE).clamp(1, MAX_SAMPLE);
    Ok(Json(state.repository.sample(limit).await?))
}

/// GET /api/summary
pub async fn summary(State(state): State<AppState>) -> Result<Json<SalesSummary>, AppError> {
    match state.repository.aggregate(AggregateQuery::Summary).await? {
        Aggregate::Summary(summary) => Ok(Json(summary)),
        other => Err(unexpected(AggregateQuery::Summary, &other)),
    }
}

/// GET /api/sales_by_category
pub async fn sales_by_category(
    State(state): State<AppState>,
) -> Result<Json<Vec<BreakdownRow>>, AppError> {
    breakdown(&state, AggregateQuery::SalesByCategory).await
}

/// GET /api/sales_by_gender
pub async fn sales_by_gender(
    State(state): State<AppState>,
) -> Result<Json<Vec<BreakdownRow>>, AppError> {
    breakdown(&state, AggregateQuery::SalesByGender).await
}

/// GET /api/payment_methods
pub async fn payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Vec<BreakdownRow>>, AppError> {
    breakdown(&state, AggregateQuery::PaymentMethods).await
}

/// GET /api/profit_margin
pub async fn profit_margin(
    State(state): State<AppState>,
) -> Result<Json<Vec<BreakdownRow>>, AppError> {
    breakdown(&state, AggregateQuery::ProfitMargin).await
}

/// GET /api/categories - Distinct categories, `"All"` first.
pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, AppError> {
    match state.repository.aggregate(AggregateQuery::Categories).await? {
        Aggregate::Categories(categories) => Ok(Json(CategoriesResponse { categories })),
        other => Err(unexpected(AggregateQuery::Categories, &other)),
    }
}

/// GET /api/timeseries?category= - Monthly totals for one category.
pub async fn timeseries(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<TimeseriesResponse>, AppError> {
    let category = query.category();
    let series = state.repository.monthly_series(category).await?;
    if series.is_empty() {
        return Err(RepositoryError::NotFound {
            entity_type: "Sales data for category",
            id: category.to_string(),
        }
        .into());
    }

    Ok(Json(TimeseriesResponse {
        category: category.to_string(),
        data: series
            .into_iter()
            .map(|p| TimeseriesPoint {
                ds: p.month,
                y: p.total_sales,
            })
            .collect(),
    }))
}

/// POST /api/clear_cache - Drops every cached entry.
pub async fn clear_cache(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let cleared = state.cache.entry_count().await;
    state.cache.invalidate_all().await?;
    tracing::info!(cleared, "Cache cleared on request");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "status": "cache_cleared", "cleared": cleared })),
    ))
}

async fn breakdown(
    state: &AppState,
    query: AggregateQuery,
) -> Result<Json<Vec<BreakdownRow>>, AppError> {
    match state.repository.aggregate(query).await? {
        Aggregate::Breakdown(rows) => Ok(Json(rows)),
        other => Err(unexpected(query, &other)),
    }
}

fn unexpected(query: AggregateQuery, result: &Aggregate) -> AppError {
    AppError(anyhow::anyhow!(
        "aggregate {} returned an unexpected result: {:?}",
        query.name(),
        result
    ))
}
