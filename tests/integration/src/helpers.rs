//! Test helpers for integration tests
//!
//! Provides a service context over a document store and the recording platform,
//! a health server bound to a free port, and the environment check that gates
//! PostgreSQL-backed tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use muster_bot::server::create_app;
use muster_bot::state::AppState;
use muster_common::{
    AppConfig, AppSettings, DiscordConfig, Environment, OnboardingConfig, ServerConfig, StoreBackend,
    StoreConfig,
};
use muster_core::{DocumentStore, MemberRecord, Snowflake};
use muster_db::{create_pool, run_migrations, MemoryDocumentStore, PgDocumentStore, PoolConfig};
use muster_service::testing::RecordingPlatform;
use muster_service::{
    CommandInvocation, CommandRegistry, MemberDirectory, Reply, ServiceContext, ServiceContextBuilder,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::GUILD;

/// Service context wired to a store and a recording platform
pub struct TestContext {
    pub ctx: ServiceContext,
    pub platform: Arc<RecordingPlatform>,
    pub registry: CommandRegistry,
}

impl TestContext {
    /// Context over a fresh in-memory store
    pub fn memory() -> Self {
        Self::with_store(Arc::new(MemoryDocumentStore::new()))
    }

    /// Context over the PostgreSQL store at `DATABASE_URL`
    pub async fn postgres() -> Result<Self> {
        let url = std::env::var("DATABASE_URL")?;
        let pool = create_pool(&PoolConfig::new(url)).await?;
        run_migrations(&pool).await?;
        Ok(Self::with_store(Arc::new(PgDocumentStore::new(pool))))
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let platform = Arc::new(RecordingPlatform::new());
        let ctx = ServiceContextBuilder::new()
            .store(store)
            .platform(platform.clone())
            .onboarding(OnboardingConfig::default())
            .guild_id(GUILD)
            .build()
            .expect("complete service context");

        Self {
            ctx,
            platform,
            registry: CommandRegistry::standard(),
        }
    }

    /// Run a command the way the bot does
    pub async fn dispatch(&self, invocation: &CommandInvocation) -> Reply {
        self.registry.dispatch(&self.ctx, invocation).await
    }

    /// Stored directory record of a member
    pub async fn record(&self, id: Snowflake) -> MemberRecord {
        MemberDirectory::new(&self.ctx)
            .get(id)
            .await
            .expect("directory read")
            .expect("member record exists")
    }
}

/// Configuration for a memory-backed bot that never reaches Discord
pub fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "muster".to_string(),
            env: Environment::Development,
        },
        discord: DiscordConfig {
            token: "test-token".to_string(),
            guild_id: GUILD,
            api_base: "http://127.0.0.1:9/api/v10".to_string(),
            gateway_url: "ws://127.0.0.1:9/?v=10&encoding=json".to_string(),
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            database: None,
        },
        http: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: None,
        },
        onboarding: OnboardingConfig::default(),
    }
}

/// Health server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server over the given context
    pub async fn start(context: &TestContext, config: AppConfig) -> Result<Self> {
        let state = AppState::new(context.ctx.clone(), Default::default(), config);
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }
}

/// Helper to check if a PostgreSQL test database is available
pub fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {}, got {}. Body: {}", expected_status, status, body);
    }
    Ok(response.json().await?)
}
