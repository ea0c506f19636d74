//! Gateway payload definitions
//!
//! Payloads the bot exchanges with the gateway outside of dispatched events.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Gateway intents requested on identify
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        const GUILDS         = 1 << 0;
        /// Privileged; required for member join/leave events
        const GUILD_MEMBERS  = 1 << 1;
        const GUILD_MESSAGES = 1 << 9;
    }
}

impl Intents {
    /// Intents the onboarding workflow needs
    #[must_use]
    pub const fn onboarding() -> Self {
        Self::GUILDS.union(Self::GUILD_MEMBERS).union(Self::GUILD_MESSAGES)
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from_bits_truncate(u64::deserialize(deserializer)?))
    }
}

/// Payload for op 10 (Hello)
///
/// Sent by the gateway immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub intents: Intents,
    pub properties: IdentifyProperties,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence: Option<PresenceUpdatePayload>,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: impl Into<String>, intents: Intents) -> Self {
        Self {
            token: token.into(),
            intents,
            properties: IdentifyProperties::default(),
            presence: None,
        }
    }

    #[must_use]
    pub fn with_presence(mut self, presence: PresenceUpdatePayload) -> Self {
        self.presence = Some(presence);
        self
    }
}

/// Client connection properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "muster".to_string(),
            device: "muster".to_string(),
        }
    }
}

/// Activity kinds shown in a presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ActivityKind {
    Playing,
    Streaming,
    Listening,
    Watching,
    Custom,
    Competing,
}

impl From<ActivityKind> for u8 {
    fn from(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Playing => 0,
            ActivityKind::Streaming => 1,
            ActivityKind::Listening => 2,
            ActivityKind::Watching => 3,
            ActivityKind::Custom => 4,
            ActivityKind::Competing => 5,
        }
    }
}

impl TryFrom<u8> for ActivityKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Playing),
            1 => Ok(Self::Streaming),
            2 => Ok(Self::Listening),
            3 => Ok(Self::Watching),
            4 => Ok(Self::Custom),
            5 => Ok(Self::Competing),
            _ => Err(format!("invalid activity type: {value}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
}

/// Payload for op 3 (Presence Update)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUpdatePayload {
    /// Unix time in milliseconds the bot went idle
    pub since: Option<u64>,
    pub activities: Vec<Activity>,
    /// online, idle, dnd or invisible
    pub status: String,
    pub afk: bool,
}

impl PresenceUpdatePayload {
    /// Valid status values
    pub const VALID_STATUSES: &'static [&'static str] = &["online", "idle", "dnd", "invisible"];

    /// Online with a single activity
    #[must_use]
    pub fn online(kind: ActivityKind, name: impl Into<String>) -> Self {
        Self {
            since: None,
            activities: vec![Activity {
                name: name.into(),
                kind,
            }],
            status: "online".to_string(),
            afk: false,
        }
    }

    /// Check if the status is valid
    #[must_use]
    pub fn is_valid_status(&self) -> bool {
        Self::VALID_STATUSES.contains(&self.status.as_str())
    }
}

/// Payload for op 6 (Resume)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    /// Last received sequence number
    pub seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onboarding_intents() {
        let intents = Intents::onboarding();
        assert_eq!(intents.bits(), 1 | 2 | 512);
        assert_eq!(serde_json::to_string(&intents).unwrap(), "515");
    }

    #[test]
    fn test_identify_payload_serialization() {
        let payload = IdentifyPayload::new("secret", Intents::onboarding());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["token"], "secret");
        assert_eq!(json["intents"], 515);
        assert_eq!(json["properties"]["browser"], "muster");
        assert!(json.get("presence").is_none());
    }

    #[test]
    fn test_presence_serialization() {
        let presence = PresenceUpdatePayload::online(ActivityKind::Listening, "enemy comms...");
        assert!(presence.is_valid_status());

        let json = serde_json::to_value(&presence).unwrap();
        assert_eq!(json["activities"][0]["type"], 2);
        assert_eq!(json["activities"][0]["name"], "enemy comms...");
        assert_eq!(json["since"], serde_json::Value::Null);
        assert_eq!(json["afk"], false);
    }

    #[test]
    fn test_invalid_status() {
        let mut presence = PresenceUpdatePayload::online(ActivityKind::Playing, "Arma 3");
        presence.status = "busy".to_string();
        assert!(!presence.is_valid_status());
    }

    #[test]
    fn test_hello_payload_deserialization() {
        let hello: HelloPayload = serde_json::from_str(r#"{"heartbeat_interval": 41250}"#).unwrap();
        assert_eq!(hello.heartbeat_interval, 41_250);
    }
}
