use axum::Json;

use crate::api::types::HealthResponse;
use crate::config;

/// `GET /api/health` — unauthenticated liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
    })
}
