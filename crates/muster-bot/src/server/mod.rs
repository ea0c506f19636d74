//! Server setup and initialization
//!
//! Builds every dependency from configuration, then runs the gateway client and
//! the HTTP server side by side until either stops or the process is told to.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use muster_common::{AppConfig, AppError, ConfigError, StoreBackend, StoreConfig};
use muster_core::DocumentStore;
use muster_db::{create_pool, run_migrations, MemoryDocumentStore, PgDocumentStore, PoolConfig};
use muster_discord::{DiscordRest, GatewayClient, GatewayConfig, GatewayHandle};
use muster_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::bot::Bot;
use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router(state.config().http.static_dir.as_deref());
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Open the configured document store
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or(ConfigError::MissingVar("DATABASE_URL"))?;

            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&PoolConfig::from(database))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            run_migrations(&pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            Ok(Arc::new(PgDocumentStore::new(pool)))
        }
    }
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Run the bot with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .http
        .address()
        .parse()
        .map_err(|_| ConfigError::InvalidValue("HTTP_HOST", config.http.host.clone()))?;

    let store = create_store(&config.store).await?;
    let rest = Arc::new(DiscordRest::new(&config.discord.api_base, &config.discord.token)?);

    let service_context = ServiceContextBuilder::new()
        .store(store)
        .platform(rest.clone())
        .onboarding(config.onboarding.clone())
        .guild_id(config.discord.guild_id)
        .build()
        .map_err(AppError::internal)?;

    let handle = GatewayHandle::default();
    let bot = Bot::new(service_context.clone(), rest, handle.clone());
    let gateway = GatewayClient::new(
        GatewayConfig::new(&config.discord.gateway_url, &config.discord.token),
        Arc::new(bot),
    )
    .with_handle(handle.clone());

    let app = create_app(AppState::new(service_context, handle, config));

    tokio::select! {
        result = run_server(app, addr) => result,
        result = gateway.run() => result.map_err(|e| AppError::Gateway(e.to_string())),
        () = shutdown_signal() => {
            info!("Shutdown signal received");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
