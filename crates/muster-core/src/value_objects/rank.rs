//! Preference rank - how often a member wants to play a role

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Closed set of preference ranks, stored as their integer value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Never = 1,
    Sometimes = 2,
    Always = 3,
}

impl Rank {
    /// Every rank, lowest first
    pub const ALL: [Rank; 3] = [Self::Never, Self::Sometimes, Self::Always];

    /// Integer value written to the store
    pub const fn value(self) -> i64 {
        self as i64
    }

    /// Human-readable label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Sometimes => "sometimes",
            Self::Always => "always",
        }
    }

    /// Look up a rank by its integer value
    pub fn from_value(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|rank| rank.value() == value)
    }

    /// Look up a rank by its label (exact, lowercase)
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rank| rank.label() == label)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.value())
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Self::from_value(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid rank value: {value}")))
    }
}
