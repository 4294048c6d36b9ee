use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use salespulse_core::training::{TrainingState, TrainingTicket};

use crate::handlers::analytics::CategoryQuery;
use crate::handlers::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub status: &'static str,
    pub category: String,
    pub accepted: bool,
    pub deduplicated: bool,
    pub state: TrainingState,
    pub message: String,
}

impl From<TrainingTicket> for TrainResponse {
    fn from(ticket: TrainingTicket) -> Self {
        let message = if ticket.deduplicated {
            format!("Training for '{}' is already in progress", ticket.category)
        } else {
            format!("Training started for '{}'", ticket.category)
        };
        Self {
            status: "training_queued",
            category: ticket.category,
            accepted: ticket.accepted,
            deduplicated: ticket.deduplicated,
            state: ticket.state,
            message,
        }
    }
}

/// POST /api/train_forecast?category= - Queues a background training job.
///
/// Progress is reported to connected observers as training events.
pub async fn train_forecast(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<(StatusCode, Json<TrainResponse>), AppError> {
    let ticket = state.coordinator.request_training(query.category()).await?;
    Ok((StatusCode::ACCEPTED, Json(ticket.into())))
}

/// GET /api/training?category= - Job for one category, or every tracked job.
pub async fn training_status(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Response {
    let Some(category) = query.category.as_deref() else {
        let jobs = state.coordinator.active_jobs().await;
        return Json(serde_json::json!({ "jobs": jobs })).into_response();
    };

    match state.coordinator.status(category).await {
        Some(job) => Json(job).into_response(),
        None => Json(serde_json::json!({ "category": category, "state": "idle" })).into_response(),
    }
}
