use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    uploads: UploadHealth,
}

#[derive(Serialize)]
pub struct UploadHealth {
    active_sessions: usize,
}

/// Health check endpoint
///
/// The service holds no external connections at rest; the interesting
/// signal is how many upload sessions are live.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    let active_sessions = state.tracker.store().count().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        uploads: UploadHealth { active_sessions },
    })
}
