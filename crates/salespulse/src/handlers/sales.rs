use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use salespulse_core::sales::NewSale;

use crate::handlers::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub inserted: usize,
}

/// POST /api/sales - Appends a batch of order lines.
///
/// Cache invalidation and the `data_updated` broadcast follow from the
/// database change hook, not from this handler.
pub async fn create_sales(
    State(state): State<AppState>,
    Json(batch): Json<Vec<NewSale>>,
) -> Result<(StatusCode, Json<InsertResponse>), AppError> {
    let inserted = state.repository.insert_sales(&batch).await?;
    tracing::info!(inserted, "Sales inserted");
    Ok((StatusCode::CREATED, Json(InsertResponse { inserted })))
}
