//! Lifecycle events - membership and message activity reported by the platform
//!
//! These drive the onboarding workflow and the per-member activity counters.

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Identity of a member as seen on a single event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: Snowflake,
    pub username: String,
    /// Guild nickname, global display name or username, whichever is set
    pub display_name: String,
    #[serde(default)]
    pub bot: bool,
}

impl MemberRef {
    pub fn new(id: Snowflake, username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: display_name.into(),
            bot: false,
        }
    }

    pub fn mention(&self) -> String {
        self.id.user_mention()
    }
}

/// All lifecycle events the orchestrator reacts to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEvent {
    MemberJoined {
        guild_id: Snowflake,
        member: MemberRef,
    },
    MemberLeft {
        guild_id: Snowflake,
        member: MemberRef,
    },
    MessageCreated {
        guild_id: Option<Snowflake>,
        message_id: Snowflake,
        author: MemberRef,
    },
    /// `author` is `None` when the platform did not say who wrote the message
    MessageDeleted {
        guild_id: Option<Snowflake>,
        message_id: Snowflake,
        author: Option<MemberRef>,
    },
}

impl LifecycleEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MemberJoined { .. } => "MEMBER_JOINED",
            Self::MemberLeft { .. } => "MEMBER_LEFT",
            Self::MessageCreated { .. } => "MESSAGE_CREATED",
            Self::MessageDeleted { .. } => "MESSAGE_DELETED",
        }
    }

    /// Member the event is about, if known
    pub fn member(&self) -> Option<&MemberRef> {
        match self {
            Self::MemberJoined { member, .. } | Self::MemberLeft { member, .. } => Some(member),
            Self::MessageCreated { author, .. } => Some(author),
            Self::MessageDeleted { author, .. } => author.as_ref(),
        }
    }
}
