//! Gateway event types
//!
//! Names of the dispatch events the bot reacts to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch event names, as sent in the `t` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventType {
    /// Sent after successful Identify
    Ready,
    /// Sent after successful Resume
    Resumed,
    /// Guild became available or the bot joined it
    GuildCreate,
    GuildMemberAdd,
    GuildMemberRemove,
    MessageCreate,
    MessageDelete,
    /// Slash command used
    InteractionCreate,
}

impl GatewayEventType {
    pub const ALL: [GatewayEventType; 8] = [
        Self::Ready,
        Self::Resumed,
        Self::GuildCreate,
        Self::GuildMemberAdd,
        Self::GuildMemberRemove,
        Self::MessageCreate,
        Self::MessageDelete,
        Self::InteractionCreate,
    ];

    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
            Self::GuildCreate => "GUILD_CREATE",
            Self::GuildMemberAdd => "GUILD_MEMBER_ADD",
            Self::GuildMemberRemove => "GUILD_MEMBER_REMOVE",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::MessageDelete => "MESSAGE_DELETE",
            Self::InteractionCreate => "INTERACTION_CREATE",
        }
    }

    /// Look up an event type by its dispatch name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
