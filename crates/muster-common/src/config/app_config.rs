//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use muster_core::Snowflake;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub discord: DiscordConfig,
    pub store: StoreConfig,
    pub http: ServerConfig,
    pub onboarding: OnboardingConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Discord connection settings
#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
    /// The one guild the bot serves; it leaves every other guild on startup
    pub guild_id: Snowflake,
    pub api_base: String,
    pub gateway_url: String,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("api_base", &self.api_base)
            .field("gateway_url", &self.gateway_url)
            .finish()
    }
}

/// Which document store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local, lost on restart
    Memory,
}

/// Document store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Required for [`StoreBackend::Postgres`]
    pub database: Option<DatabaseConfig>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// HTTP health/static server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Names and links used by the onboarding workflow and commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingConfig {
    /// Role whose holders see every onboarding channel and get join notifications
    pub role_name: String,
    /// Category that holds the per-member onboarding channels
    pub category_name: String,
    /// Text channel that receives `/apply` submissions
    pub applications_channel: String,
    pub rejoin_url: String,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            role_name: default_role_name(),
            category_name: default_category_name(),
            applications_channel: default_applications_channel(),
            rejoin_url: default_rejoin_url(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "muster".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_role_name() -> String {
    "ncg/recruitment".to_string()
}

fn default_category_name() -> String {
    "welcome".to_string()
}

fn default_applications_channel() -> String {
    "applications".to_string()
}

fn default_rejoin_url() -> String {
    "https://uagpmc.com/discord".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match var("STORE_BACKEND") {
            None => StoreBackend::default(),
            Some(s) => match s.to_lowercase().as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::InvalidValue("STORE_BACKEND", s)),
            },
        };

        let database = match var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_or(&var, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            }),
            None if backend == StoreBackend::Postgres => {
                return Err(ConfigError::MissingVar("DATABASE_URL"));
            }
            None => None,
        };

        let guild_id = var("DISCORD_GUILD_ID").ok_or(ConfigError::MissingVar("DISCORD_GUILD_ID"))?;
        let guild_id = Snowflake::parse(&guild_id)
            .map_err(|_| ConfigError::InvalidValue("DISCORD_GUILD_ID", guild_id))?;

        Ok(Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(default_app_name),
                env: var("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            discord: DiscordConfig {
                token: var("DISCORD_BOT_TOKEN").ok_or(ConfigError::MissingVar("DISCORD_BOT_TOKEN"))?,
                guild_id,
                api_base: var("DISCORD_API_BASE")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_api_base),
                gateway_url: var("DISCORD_GATEWAY_URL").unwrap_or_else(default_gateway_url),
            },
            store: StoreConfig { backend, database },
            http: ServerConfig {
                host: var("HTTP_HOST").unwrap_or_else(default_host),
                port: parse_or(&var, "HTTP_PORT", default_port)?,
                static_dir: var("STATIC_DIR").map(PathBuf::from),
            },
            onboarding: OnboardingConfig {
                role_name: var("ONBOARDING_ROLE_NAME").unwrap_or_else(default_role_name),
                category_name: var("ONBOARDING_CATEGORY_NAME").unwrap_or_else(default_category_name),
                applications_channel: var("APPLICATIONS_CHANNEL_NAME")
                    .unwrap_or_else(default_applications_channel),
                rejoin_url: var("REJOIN_URL").unwrap_or_else(default_rejoin_url),
            },
        })
    }
}

fn parse_or<T, V, D>(var: &V, key: &'static str, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    V: Fn(&str) -> Option<String>,
    D: FnOnce() -> T,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DISCORD_BOT_TOKEN", "token"),
        ("DISCORD_GUILD_ID", "123456789"),
        ("DATABASE_URL", "postgres://localhost/muster"),
    ];

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_environment_is_development() {
        assert!(Environment::Development.is_development());
        assert!(!Environment::Production.is_development());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.app.name, "muster");
        assert_eq!(config.discord.guild_id, Snowflake::new(123_456_789));
        assert_eq!(config.discord.api_base, "https://discord.com/api/v10");
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.http.address(), "0.0.0.0:3000");
        assert_eq!(config.onboarding, OnboardingConfig::default());
        assert_eq!(config.onboarding.role_name, "ncg/recruitment");
        assert_eq!(config.onboarding.category_name, "welcome");
    }

    #[test]
    fn test_missing_token() {
        let err = AppConfig::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DISCORD_BOT_TOKEN")));
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = AppConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_memory_backend_needs_no_database() {
        let mut vars = REQUIRED[..2].to_vec();
        vars.push(("STORE_BACKEND", "memory"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.store.database.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HTTP_PORT", "eighty"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidValue("HTTP_PORT", _))
        ));

        let vars = [
            ("DISCORD_BOT_TOKEN", "token"),
            ("DISCORD_GUILD_ID", "not-a-number"),
            ("STORE_BACKEND", "memory"),
        ];
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidValue("DISCORD_GUILD_ID", _))
        ));
    }

    #[test]
    fn test_token_is_redacted() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        let debug = format!("{:?}", config.discord);
        assert!(!debug.contains("token\""));
        assert!(debug.contains("<redacted>"));
    }
}
