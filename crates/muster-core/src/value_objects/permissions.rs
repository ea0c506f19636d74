//! Channel permission flags and overwrites
//!
//! Only the bits the onboarding spaces touch are named; the positions match
//! Discord's permission bitfield so values can be sent to the API unchanged.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::Snowflake;

bitflags! {
    /// Discord permission flags
    ///
    /// Serialized as a decimal string, which is what the API expects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// See the channel and read its messages
        const VIEW_CHANNEL         = 1 << 10;
        /// Post messages in the channel
        const SEND_MESSAGES        = 1 << 11;
        /// Read messages posted before joining the channel
        const READ_MESSAGE_HISTORY = 1 << 16;

        /// Everything a participant of a private onboarding channel needs
        const PARTICIPATE = Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::READ_MESSAGE_HISTORY.bits();
    }
}

impl Permissions {
    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_retain)
    }

    /// Get a list of all named permissions that are set
    pub fn list(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.contains(Self::VIEW_CHANNEL) {
            result.push("VIEW_CHANNEL");
        }
        if self.contains(Self::SEND_MESSAGES) {
            result.push("SEND_MESSAGES");
        }
        if self.contains(Self::READ_MESSAGE_HISTORY) {
            result.push("READ_MESSAGE_HISTORY");
        }
        result
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_retain(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Permissions::parse(value).map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

/// What a permission overwrite applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverwriteTarget {
    /// A role (the guild ID doubles as the @everyone role)
    Role(Snowflake),
    /// A single member
    Member(Snowflake),
}

impl OverwriteTarget {
    /// ID of the role or member
    pub fn id(self) -> Snowflake {
        match self {
            Self::Role(id) | Self::Member(id) => id,
        }
    }
}

/// Channel-level allow/deny pair for one role or member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionOverwrite {
    pub target: OverwriteTarget,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl PermissionOverwrite {
    /// Grant `allow` to the target
    pub fn allow(target: OverwriteTarget, allow: Permissions) -> Self {
        Self {
            target,
            allow,
            deny: Permissions::empty(),
        }
    }

    /// Deny `deny` to the target
    pub fn deny(target: OverwriteTarget, deny: Permissions) -> Self {
        Self {
            target,
            allow: Permissions::empty(),
            deny,
        }
    }

    /// Hide the channel from everyone in the guild
    pub fn hide_from_everyone(guild_id: Snowflake) -> Self {
        Self::deny(OverwriteTarget::Role(guild_id), Permissions::VIEW_CHANNEL)
    }
}
