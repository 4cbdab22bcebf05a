//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Handles `GET /health`.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
