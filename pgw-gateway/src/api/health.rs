//! Health check endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use pgw_common::api::HealthReport;

use crate::AppState;

/// GET /health
///
/// 200 when every dependency is up, 503 otherwise so orchestrators take the
/// instance out of rotation. Does NOT require authentication.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    let status = if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
