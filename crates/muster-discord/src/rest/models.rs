//! REST request and response bodies

use muster_core::{
    ChannelKind, ChannelRef, CreateChannel, GuildRef, OverwriteTarget, PermissionOverwrite,
    Permissions, RoleRef, Snowflake,
};
use serde::{Deserialize, Serialize};

/// Discord channel type codes
pub mod channel_type {
    pub const GUILD_TEXT: u8 = 0;
    pub const GUILD_CATEGORY: u8 = 4;
}

pub(crate) fn channel_type_of(kind: ChannelKind) -> u8 {
    match kind {
        ChannelKind::Text => channel_type::GUILD_TEXT,
        ChannelKind::Category => channel_type::GUILD_CATEGORY,
    }
}

fn channel_kind_of(kind: u8) -> Option<ChannelKind> {
    match kind {
        channel_type::GUILD_TEXT => Some(ChannelKind::Text),
        channel_type::GUILD_CATEGORY => Some(ChannelKind::Category),
        _ => None,
    }
}

/// Error body returned on non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
    /// Seconds, only on 429
    #[serde(default)]
    pub retry_after: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RolePayload {
    pub id: Snowflake,
    pub name: String,
}

impl From<RolePayload> for RoleRef {
    fn from(role: RolePayload) -> Self {
        Self {
            id: role.id,
            name: role.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRoleRequest<'a> {
    pub name: &'a str,
    pub permissions: Permissions,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelPayload {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
}

impl ChannelPayload {
    /// `None` for channel types the bot never works with
    pub fn into_channel_ref(self, guild_id: Snowflake) -> Option<ChannelRef> {
        Some(ChannelRef {
            id: self.id,
            guild_id,
            kind: channel_kind_of(self.kind)?,
            name: self.name.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OverwritePayload {
    pub id: Snowflake,
    /// 0 for a role, 1 for a member
    #[serde(rename = "type")]
    pub kind: u8,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl From<&PermissionOverwrite> for OverwritePayload {
    fn from(overwrite: &PermissionOverwrite) -> Self {
        let kind = match overwrite.target {
            OverwriteTarget::Role(_) => 0,
            OverwriteTarget::Member(_) => 1,
        };
        Self {
            id: overwrite.target.id(),
            kind,
            allow: overwrite.allow,
            deny: overwrite.deny,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateChannelRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<&'a str>,
    pub permission_overwrites: Vec<OverwritePayload>,
}

impl<'a> From<&'a CreateChannel> for CreateChannelRequest<'a> {
    fn from(request: &'a CreateChannel) -> Self {
        Self {
            name: &request.name,
            kind: channel_type_of(request.kind),
            parent_id: request.parent_id,
            topic: request.topic.as_deref(),
            permission_overwrites: request.overwrites.iter().map(OverwritePayload::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuildPayload {
    pub id: Snowflake,
    pub name: String,
}

impl From<GuildPayload> for GuildRef {
    fn from(guild: GuildPayload) -> Self {
        Self {
            id: guild.id,
            name: guild.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuildMemberUser {
    pub id: Snowflake,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuildMemberPayload {
    pub user: GuildMemberUser,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateDmRequest {
    pub recipient_id: Snowflake,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DmChannelPayload {
    pub id: Snowflake,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageRequest<'a> {
    pub content: &'a str,
}

/// Interaction callback types
pub mod callback_type {
    pub const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
}

/// Message flag that limits visibility to the invoking user
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

#[derive(Debug, Serialize)]
pub(crate) struct InteractionResponse<'a> {
    #[serde(rename = "type")]
    pub kind: u8,
    pub data: InteractionResponseData<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InteractionResponseData<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_channel_request() {
        let request = CreateChannel::new("recruit", ChannelKind::Text)
            .parent(Snowflake::new(3))
            .topic("Onboarding channel for Recruit (42)")
            .overwrite(PermissionOverwrite::allow(
                OverwriteTarget::Member(Snowflake::new(42)),
                Permissions::PARTICIPATE,
            ))
            .overwrite(PermissionOverwrite::hide_from_everyone(Snowflake::new(1000)));

        let json = serde_json::to_value(CreateChannelRequest::from(&request)).unwrap();
        assert_eq!(json["type"], 0);
        assert_eq!(json["parent_id"], "3");
        assert_eq!(
            json["permission_overwrites"],
            json!([
                {"id": "42", "type": 1, "allow": "68608", "deny": "0"},
                {"id": "1000", "type": 0, "allow": "0", "deny": "1024"}
            ])
        );
    }

    #[test]
    fn test_category_request_omits_parent_and_topic() {
        let request = CreateChannel::new("welcome", ChannelKind::Category);
        let json = serde_json::to_value(CreateChannelRequest::from(&request)).unwrap();
        assert_eq!(json["type"], 4);
        assert!(json.get("parent_id").is_none());
        assert!(json.get("topic").is_none());
    }

    #[test]
    fn test_channel_payload_kind() {
        let voice: ChannelPayload = serde_json::from_value(json!({"id": "5", "type": 2, "name": "voice"})).unwrap();
        assert!(voice.into_channel_ref(Snowflake::new(1)).is_none());

        let text: ChannelPayload = serde_json::from_value(json!({"id": "6", "type": 0, "name": "applications"})).unwrap();
        let channel = text.into_channel_ref(Snowflake::new(1)).unwrap();
        assert_eq!(channel.kind, ChannelKind::Text);
        assert_eq!(channel.name, "applications");
    }

    #[test]
    fn test_ephemeral_response() {
        let response = InteractionResponse {
            kind: callback_type::CHANNEL_MESSAGE_WITH_SOURCE,
            data: InteractionResponseData {
                content: "Unknown subcommand.",
                flags: Some(EPHEMERAL_FLAG),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({"type": 4, "data": {"content": "Unknown subcommand.", "flags": 64}}));
    }
}
