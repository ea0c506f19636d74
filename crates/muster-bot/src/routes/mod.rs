//! Route definitions

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::handlers::health;
use crate::state::AppState;

/// Create the router; unmatched paths fall through to `static_dir` when set
pub fn create_router(static_dir: Option<&Path>) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(health::root))
        .merge(health_routes());

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}
