//! Health check handlers
//!
//! Endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};

use crate::response::{HealthResponse, ReadinessResponse, RootResponse};
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse::hello())
}

/// Basic health check (liveness probe)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness check with dependency health
///
/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let store_healthy = match state.service_context().store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Document store ping failed");
            false
        }
    };

    let response = ReadinessResponse::new(store_healthy, state.gateway().is_connected());
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
