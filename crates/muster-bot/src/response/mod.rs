//! Response bodies of the HTTP surface

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Body of `GET /`
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

impl RootResponse {
    #[must_use]
    pub fn hello() -> Self {
        Self {
            message: "Hello, world!",
        }
    }
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness response with dependency health
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub store: bool,
    pub gateway: bool,
}

impl ReadinessResponse {
    /// Ready when the store answers; a gateway reconnect does not make the bot unready
    #[must_use]
    pub fn new(store: bool, gateway: bool) -> Self {
        Self {
            status: if store { "ready" } else { "not_ready" },
            store,
            gateway,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.store
    }
}
