//! Service context - dependency container for services
//!
//! Holds the document store, the platform client and the onboarding settings
//! every service needs. Cloning is cheap and clones share the same state.

use std::sync::Arc;

use muster_common::OnboardingConfig;
use muster_core::traits::{DocumentStore, PlatformClient};
use muster_core::Snowflake;
use tokio::sync::Mutex;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn DocumentStore>,
    platform: Arc<dyn PlatformClient>,
    onboarding: Arc<OnboardingConfig>,
    guild_id: Snowflake,

    /// Held across lookup-then-create of the shared role and category
    singleton_lock: Arc<Mutex<()>>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        store: Arc<dyn DocumentStore>,
        platform: Arc<dyn PlatformClient>,
        onboarding: OnboardingConfig,
        guild_id: Snowflake,
    ) -> Self {
        Self {
            store,
            platform,
            onboarding: Arc::new(onboarding),
            guild_id,
            singleton_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the document store
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Get the chat platform client
    pub fn platform(&self) -> &dyn PlatformClient {
        self.platform.as_ref()
    }

    /// Get the onboarding settings
    pub fn onboarding(&self) -> &OnboardingConfig {
        &self.onboarding
    }

    /// The guild this bot serves
    pub fn guild_id(&self) -> Snowflake {
        self.guild_id
    }

    pub(crate) fn singleton_lock(&self) -> &Mutex<()> {
        &self.singleton_lock
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &"dyn DocumentStore")
            .field("platform", &"dyn PlatformClient")
            .field("onboarding", &self.onboarding)
            .field("guild_id", &self.guild_id)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    platform: Option<Arc<dyn PlatformClient>>,
    onboarding: Option<OnboardingConfig>,
    guild_id: Option<Snowflake>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn PlatformClient>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Defaults to [`OnboardingConfig::default`] when not set
    pub fn onboarding(mut self, onboarding: OnboardingConfig) -> Self {
        self.onboarding = Some(onboarding);
        self
    }

    pub fn guild_id(mut self, guild_id: Snowflake) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.store.ok_or_else(|| ServiceError::internal("store is required"))?,
            self.platform.ok_or_else(|| ServiceError::internal("platform is required"))?,
            self.onboarding.unwrap_or_default(),
            self.guild_id.ok_or_else(|| ServiceError::internal("guild_id is required"))?,
        ))
    }
}
