//! Chat platform port
//!
//! Everything the onboarding workflow and the commands need from the chat
//! platform: roles, channels, messages and member lookups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::value_objects::{PermissionOverwrite, Snowflake};

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Platform-side failures
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("HTTP {status} (code {code}): {message}")]
    Http { status: u16, code: u32, message: String },

    /// The recipient does not accept direct messages from us
    #[error("cannot send messages to {0}")]
    RecipientUnreachable(Snowflake),

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode platform response: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Check if retrying later might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Transport(_) => true,
            Self::Http { status, .. } => *status >= 500,
            Self::RecipientUnreachable(_) | Self::Decode(_) => false,
        }
    }
}

/// Channel types the workflow creates or looks up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRef {
    pub id: Snowflake,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRef {
    pub id: Snowflake,
    pub name: String,
}

/// Channel creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateChannel {
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<Snowflake>,
    pub topic: Option<String>,
    pub overwrites: Vec<PermissionOverwrite>,
}

impl CreateChannel {
    pub fn new(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent_id: None,
            topic: None,
            overwrites: Vec::new(),
        }
    }

    pub fn parent(mut self, parent_id: Snowflake) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn overwrite(mut self, overwrite: PermissionOverwrite) -> Self {
        self.overwrites.push(overwrite);
        self
    }
}

#[async_trait]
pub trait PlatformClient: Send + Sync {
    // =========================================================================
    // Roles
    // =========================================================================

    /// Find a guild role by exact name
    async fn find_role_by_name(&self, guild_id: Snowflake, name: &str) -> PlatformResult<Option<RoleRef>>;

    /// Create a guild role with no permissions
    async fn create_role(&self, guild_id: Snowflake, name: &str) -> PlatformResult<RoleRef>;

    /// IDs of every member currently holding a role
    async fn members_with_role(&self, guild_id: Snowflake, role_id: Snowflake) -> PlatformResult<Vec<Snowflake>>;

    // =========================================================================
    // Channels
    // =========================================================================

    /// Find a guild channel of the given kind by exact name
    async fn find_channel_by_name(
        &self,
        guild_id: Snowflake,
        name: &str,
        kind: ChannelKind,
    ) -> PlatformResult<Option<ChannelRef>>;

    async fn create_channel(&self, guild_id: Snowflake, request: &CreateChannel) -> PlatformResult<ChannelRef>;

    /// Link that opens a channel in the client
    fn channel_url(&self, guild_id: Snowflake, channel_id: Snowflake) -> String {
        format!("https://discord.com/channels/{guild_id}/{channel_id}")
    }

    // =========================================================================
    // Messages
    // =========================================================================

    async fn send_channel_message(&self, channel_id: Snowflake, content: &str) -> PlatformResult<()>;

    /// Fails with [`PlatformError::RecipientUnreachable`] when the user blocks DMs
    async fn send_direct_message(&self, user_id: Snowflake, content: &str) -> PlatformResult<()>;

    // =========================================================================
    // Housekeeping
    // =========================================================================

    /// Guilds the bot is currently in
    async fn list_guilds(&self) -> PlatformResult<Vec<GuildRef>>;

    async fn leave_guild(&self, guild_id: Snowflake) -> PlatformResult<()>;

    /// Replace the guild's application commands with `commands`
    async fn register_commands(
        &self,
        application_id: Snowflake,
        guild_id: Snowflake,
        commands: &Value,
    ) -> PlatformResult<()>;
}
