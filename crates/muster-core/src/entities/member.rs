//! Member record - one document per platform identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::document::DocumentPatch;
use crate::error::DomainError;
use crate::value_objects::Snowflake;

use super::preference::Preferences;
use super::provisioning::ProvisioningReport;

/// Field names of a member document
pub mod fields {
    pub const ID: &str = "id";
    pub const LAST_KNOWN_DISPLAY_NAME: &str = "lastKnownDisplayName";
    pub const MESSAGE_COUNT: &str = "messageCount";
    pub const JOIN_HISTORY: &str = "joinHistory";
    pub const LEAVE_HISTORY: &str = "leaveHistory";
    pub const INSERTED_AT: &str = "insertedAt";
    pub const LAST_KNOWN_GUILD_ID: &str = "lastKnownGuildId";
    pub const LAST_KNOWN_GUILD_NAME: &str = "lastKnownGuildName";
    pub const PROVISIONING: &str = "provisioning";
}

/// Member record as read back from the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: Snowflake,
    #[serde(default)]
    pub last_known_display_name: String,
    /// May go negative: deletes are counted even when the create was never seen
    #[serde(default)]
    pub message_count: i64,
    #[serde(default)]
    pub join_history: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub leave_history: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub inserted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_known_guild_id: Option<Snowflake>,
    #[serde(default)]
    pub last_known_guild_name: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub provisioning: Option<ProvisioningReport>,
}

impl MemberRecord {
    /// Number of times the member has joined
    #[inline]
    pub fn join_count(&self) -> usize {
        self.join_history.len()
    }

    /// Whether the member's most recent lifecycle event was a leave
    pub fn has_left(&self) -> bool {
        match (self.join_history.last(), self.leave_history.last()) {
            (Some(joined), Some(left)) => left > joined,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}

/// Declarative update to a member record
///
/// Every update also stamps the identity and, when supplied, the latest display
/// name; everything else is opt-in.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    display_name: Option<String>,
    inserted_at: Option<DateTime<Utc>>,
    joined_at: Option<DateTime<Utc>>,
    left_at: Option<DateTime<Utc>>,
    message_delta: i64,
    guild_id: Option<Snowflake>,
    guild_name: Option<String>,
    provisioning: Option<Value>,
}

impl MemberPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the display name seen on this event
    pub fn touch(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Stamp `insertedAt` if this update creates the record
    pub fn inserted_at(mut self, at: DateTime<Utc>) -> Self {
        self.inserted_at = Some(at);
        self
    }

    pub fn record_join(mut self, at: DateTime<Utc>) -> Self {
        self.joined_at = Some(at);
        self
    }

    pub fn record_leave(mut self, at: DateTime<Utc>) -> Self {
        self.left_at = Some(at);
        self
    }

    /// Add `delta` to the message counter
    pub fn adjust_message_count(mut self, delta: i64) -> Self {
        self.message_delta = self.message_delta.saturating_add(delta);
        self
    }

    /// Remember which guild the update came from
    pub fn guild(mut self, guild_id: Snowflake) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn guild_name(mut self, guild_name: impl Into<String>) -> Self {
        self.guild_name = Some(guild_name.into());
        self
    }

    /// Replace the stored provisioning report
    pub fn provisioning(mut self, report: &ProvisioningReport) -> Result<Self, DomainError> {
        self.provisioning = Some(serde_json::to_value(report)?);
        Ok(self)
    }

    /// Lower into field operations on the member's document
    pub fn into_document_patch(self, id: Snowflake) -> DocumentPatch {
        let mut patch = DocumentPatch::new().set(fields::ID, json!(id));

        if let Some(name) = self.display_name {
            patch = patch.set(fields::LAST_KNOWN_DISPLAY_NAME, Value::String(name));
        }
        if let Some(at) = self.inserted_at {
            patch = patch.set_on_insert(fields::INSERTED_AT, json!(at));
        }
        if let Some(at) = self.joined_at {
            patch = patch.append(fields::JOIN_HISTORY, json!(at));
        }
        if let Some(at) = self.left_at {
            patch = patch.append(fields::LEAVE_HISTORY, json!(at));
        }
        if self.message_delta != 0 {
            patch = patch.increment(fields::MESSAGE_COUNT, self.message_delta);
        }
        if let Some(guild_id) = self.guild_id {
            patch = patch.set(fields::LAST_KNOWN_GUILD_ID, json!(guild_id));
        }
        if let Some(guild_name) = self.guild_name {
            patch = patch.set(fields::LAST_KNOWN_GUILD_NAME, Value::String(guild_name));
        }
        if let Some(report) = self.provisioning {
            patch = patch.set(fields::PROVISIONING, report);
        }

        patch
    }
}
