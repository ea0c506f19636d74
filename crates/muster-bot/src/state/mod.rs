//! Application state
//!
//! Shared by the HTTP handlers: the service context (for the store probe), the
//! gateway handle and the configuration.

use std::sync::Arc;

use muster_common::AppConfig;
use muster_discord::GatewayHandle;
use muster_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: ServiceContext,
    gateway: GatewayHandle,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service_context: ServiceContext, gateway: GatewayHandle, config: AppConfig) -> Self {
        Self {
            service_context,
            gateway,
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn gateway(&self) -> &GatewayHandle {
        &self.gateway
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("gateway_connected", &self.gateway.is_connected())
            .field("config", &"AppConfig")
            .finish()
    }
}
