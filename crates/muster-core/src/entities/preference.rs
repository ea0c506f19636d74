//! Role preferences - what a member likes to play and how often

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::document::FieldPath;
use crate::error::DomainError;
use crate::value_objects::{Rank, RoleKey};

/// Path of the role map inside a member document
pub const ROLES_PATH: &str = "preferences.roles";

/// Path of a single role entry inside a member document
pub fn role_path(role: RoleKey) -> FieldPath {
    FieldPath::parse(ROLES_PATH).child(role.as_str())
}

/// One stored preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceEntry {
    pub value: Rank,
    /// Mirrors `value` at write time
    pub last_updated_value_label: String,
    pub updated_at: DateTime<Utc>,
}

impl PreferenceEntry {
    /// Create an entry whose label matches its rank
    pub fn new(rank: Rank, updated_at: DateTime<Utc>) -> Self {
        Self {
            value: rank,
            last_updated_value_label: rank.label().to_string(),
            updated_at,
        }
    }

    pub fn rank(&self) -> Rank {
        self.value
    }

    /// Document representation written by the store
    pub fn to_value(&self) -> Result<Value, DomainError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Present role preferences of one member
///
/// Reading is lenient: `null` entries left by older writers, unknown role keys and
/// malformed entries are skipped rather than failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RolePreferences(BTreeMap<RoleKey, PreferenceEntry>);

impl RolePreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the raw `preferences.roles` value of a document
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        Self(
            map.iter()
                .filter(|(_, entry)| !entry.is_null())
                .filter_map(|(key, entry)| {
                    let role = RoleKey::from_key(key)?;
                    let entry = serde_json::from_value::<PreferenceEntry>(entry.clone()).ok()?;
                    Some((role, entry))
                })
                .collect(),
        )
    }

    pub fn get(&self, role: RoleKey) -> Option<&PreferenceEntry> {
        self.0.get(&role)
    }

    pub fn contains(&self, role: RoleKey) -> bool {
        self.0.contains_key(&role)
    }

    pub fn insert(&mut self, role: RoleKey, entry: PreferenceEntry) {
        self.0.insert(role, entry);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RoleKey, &PreferenceEntry)> {
        self.0.iter().map(|(role, entry)| (*role, entry))
    }
}

impl<'de> Deserialize<'de> for RolePreferences {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// The `preferences` object of a member document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// `None` when no role map has ever been written (or it was cleared)
    #[serde(default)]
    pub roles: Option<RolePreferences>,
}
