use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
}

/// Liveness check. Answers without touching storage.
pub async fn check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse { status: "ok" })
}
