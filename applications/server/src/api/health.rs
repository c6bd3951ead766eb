/// Health check API routes
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
    pub pending_sync_jobs: usize,
}

/// GET /api/health - Health check endpoint
pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let database = sqlx::query("SELECT 1")
        .execute(&app_state.pool)
        .await
        .is_ok();

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        pending_sync_jobs: app_state.channel_sync.queue_length().await,
    })
}
