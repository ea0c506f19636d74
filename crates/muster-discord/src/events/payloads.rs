//! Event payload definitions
//!
//! Only the fields the bot reads are modelled; everything else is ignored.

use muster_core::{MemberRef, Snowflake};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GatewayEventType;

// === Connection Events ===

/// READY event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    pub v: i32,

    /// The bot user
    pub user: UserPayload,

    /// Guilds the bot is in (initially unavailable)
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL to use when resuming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_gateway_url: Option<String>,

    pub application: PartialApplication,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialApplication {
    pub id: Snowflake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

// === User Payloads ===

/// User data included in events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: Snowflake,
    pub username: String,
    /// `"0"` for users on unique usernames
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl UserPayload {
    /// `name#1234` for legacy accounts, the bare username otherwise
    #[must_use]
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if d != "0" => format!("{}#{d}", self.username),
            _ => self.username.clone(),
        }
    }

    /// Member identity, preferring a guild nickname over the global name
    #[must_use]
    pub fn to_member_ref(&self, nick: Option<&str>) -> MemberRef {
        let display_name = nick
            .or(self.global_name.as_deref())
            .unwrap_or(&self.username);
        MemberRef {
            id: self.id,
            username: self.username.clone(),
            display_name: display_name.to_string(),
            bot: self.bot,
        }
    }
}

/// Guild member data included in events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPayload {
    /// Absent on members attached to MESSAGE_CREATE
    #[serde(default)]
    pub user: Option<UserPayload>,
    #[serde(default)]
    pub nick: Option<String>,
}

// === Guild Events ===

/// GUILD_CREATE event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildCreateEvent {
    pub id: Snowflake,
    pub name: String,
}

/// GUILD_MEMBER_ADD event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildMemberAddEvent {
    pub guild_id: Snowflake,
    pub user: UserPayload,
    #[serde(default)]
    pub nick: Option<String>,
}

impl GuildMemberAddEvent {
    #[must_use]
    pub fn member(&self) -> MemberRef {
        self.user.to_member_ref(self.nick.as_deref())
    }
}

/// GUILD_MEMBER_REMOVE event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildMemberRemoveEvent {
    pub guild_id: Snowflake,
    pub user: UserPayload,
}

// === Message Events ===

/// MESSAGE_CREATE event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreateEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub author: UserPayload,
    #[serde(default)]
    pub member: Option<MemberPayload>,
}

impl MessageCreateEvent {
    #[must_use]
    pub fn author(&self) -> MemberRef {
        let nick = self.member.as_ref().and_then(|m| m.nick.as_deref());
        self.author.to_member_ref(nick)
    }
}

/// MESSAGE_DELETE event payload; the author is never included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeleteEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

// === Interactions ===

/// Interaction types
pub mod interaction_type {
    pub const PING: u8 = 1;
    pub const APPLICATION_COMMAND: u8 = 2;
}

/// INTERACTION_CREATE event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionCreateEvent {
    pub id: Snowflake,
    pub application_id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    /// Token for the interaction response
    pub token: String,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    /// Set when used in a guild
    #[serde(default)]
    pub member: Option<MemberPayload>,
    /// Set when used in a DM
    #[serde(default)]
    pub user: Option<UserPayload>,
    #[serde(default)]
    pub data: Option<CommandData>,
}

impl InteractionCreateEvent {
    /// The member or user who triggered the interaction
    #[must_use]
    pub fn invoker(&self) -> Option<MemberRef> {
        match (&self.member, &self.user) {
            (Some(MemberPayload { user: Some(user), nick }), _) => Some(user.to_member_ref(nick.as_deref())),
            (_, Some(user)) => Some(user.to_member_ref(None)),
            _ => None,
        }
    }
}

/// Application command data of an interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
}

/// One option, subcommand or subcommand group of an interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
}

/// A decoded dispatch event
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready(Box<ReadyEvent>),
    Resumed,
    GuildCreate(GuildCreateEvent),
    MemberAdd(GuildMemberAddEvent),
    MemberRemove(GuildMemberRemoveEvent),
    MessageCreate(Box<MessageCreateEvent>),
    MessageDelete(MessageDeleteEvent),
    InteractionCreate(Box<InteractionCreateEvent>),
    /// Any dispatch the bot does not react to
    Unknown(String),
}

impl GatewayEvent {
    /// Decode the `d` payload of a dispatch named `t`
    ///
    /// # Errors
    /// Returns an error if a known event carries a malformed payload
    pub fn parse(t: &str, d: Value) -> Result<Self, serde_json::Error> {
        let Some(event_type) = GatewayEventType::from_name(t) else {
            return Ok(Self::Unknown(t.to_string()));
        };

        Ok(match event_type {
            GatewayEventType::Ready => Self::Ready(Box::new(serde_json::from_value(d)?)),
            GatewayEventType::Resumed => Self::Resumed,
            GatewayEventType::GuildCreate => Self::GuildCreate(serde_json::from_value(d)?),
            GatewayEventType::GuildMemberAdd => Self::MemberAdd(serde_json::from_value(d)?),
            GatewayEventType::GuildMemberRemove => Self::MemberRemove(serde_json::from_value(d)?),
            GatewayEventType::MessageCreate => Self::MessageCreate(Box::new(serde_json::from_value(d)?)),
            GatewayEventType::MessageDelete => Self::MessageDelete(serde_json::from_value(d)?),
            GatewayEventType::InteractionCreate => {
                Self::InteractionCreate(Box::new(serde_json::from_value(d)?))
            }
        })
    }

    /// Dispatch name of this event
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Ready(_) => GatewayEventType::Ready.as_str(),
            Self::Resumed => GatewayEventType::Resumed.as_str(),
            Self::GuildCreate(_) => GatewayEventType::GuildCreate.as_str(),
            Self::MemberAdd(_) => GatewayEventType::GuildMemberAdd.as_str(),
            Self::MemberRemove(_) => GatewayEventType::GuildMemberRemove.as_str(),
            Self::MessageCreate(_) => GatewayEventType::MessageCreate.as_str(),
            Self::MessageDelete(_) => GatewayEventType::MessageDelete.as_str(),
            Self::InteractionCreate(_) => GatewayEventType::InteractionCreate.as_str(),
            Self::Unknown(name) => name,
        }
    }
}
