//! Health check endpoints.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Passive stats for the cache, observers and training jobs

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use salespulse_core::cache::Cache;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub cache_entries: usize,
    pub active_connections: usize,
    pub training_jobs: usize,
}

/// GET / - Service banner.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "salespulse sales analytics API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy",
        cache_entries: state.cache.entry_count().await,
        active_connections: state.broadcaster.len().await,
        training_jobs: state.coordinator.active_jobs().await.len(),
    })
}
