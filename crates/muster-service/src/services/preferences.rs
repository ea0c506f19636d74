//! Preference service
//!
//! Structured merge, query and delete over a member's `preferences.roles` map.
//! Every write is a partial patch on the member document, so writing one role
//! never disturbs another role or any directory field.

use chrono::Utc;
use muster_core::entities::{role_path, MemberPatch, PreferenceEntry, RolePreferences, ROLES_PATH};
use muster_core::{
    parse_preference_string, DocumentPatch, DomainError, FieldPath, MemberRef, Rank, RoleKey, Snowflake,
    MEMBERS_COLLECTION,
};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Who is editing preferences, and from where
#[derive(Debug, Clone)]
pub struct MemberScope {
    pub guild_id: Snowflake,
    /// Not every event carries the guild name
    pub guild_name: Option<String>,
    pub member: MemberRef,
}

impl MemberScope {
    pub fn new(guild_id: Snowflake, member: MemberRef) -> Self {
        Self {
            guild_id,
            guild_name: None,
            member,
        }
    }

    #[must_use]
    pub fn with_guild_name(mut self, guild_name: impl Into<String>) -> Self {
        self.guild_name = Some(guild_name.into());
        self
    }

    /// Directory fields stamped alongside every preference write
    fn touch(&self) -> DocumentPatch {
        let mut patch = MemberPatch::new()
            .touch(self.member.display_name.clone())
            .inserted_at(Utc::now())
            .guild(self.guild_id);
        if let Some(name) = &self.guild_name {
            patch = patch.guild_name(name.clone());
        }
        patch.into_document_patch(self.member.id)
    }
}

/// Result of a delete that first checks for presence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NothingSet,
}

/// Preference service
pub struct PreferenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PreferenceService<'a> {
    /// Create a new PreferenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Set one role preference; last write wins
    #[instrument(skip(self, scope), fields(member_id = %scope.member.id))]
    pub async fn set(&self, scope: &MemberScope, role: RoleKey, rank: Rank) -> ServiceResult<PreferenceEntry> {
        let entry = PreferenceEntry::new(rank, Utc::now());
        let patch = scope.touch().set(role_path(role), entry.to_value()?);

        self.write(scope.member.id, &patch).await?;

        info!(role = %role, rank = %rank, "Preference set");
        Ok(entry)
    }

    /// Present role preferences; empty when none were ever set
    #[instrument(skip(self))]
    pub async fn get(&self, member_id: Snowflake) -> ServiceResult<RolePreferences> {
        Ok(self
            .raw_roles(member_id)
            .await?
            .map(|roles| RolePreferences::from_value(&Value::Object(roles)))
            .unwrap_or_default())
    }

    /// Delete one role preference if it is set
    #[instrument(skip(self, scope), fields(member_id = %scope.member.id))]
    pub async fn remove(&self, scope: &MemberScope, role: RoleKey) -> ServiceResult<Removal> {
        // Unreadable entries still count; only a missing or null key is absent
        let present = self
            .raw_roles(scope.member.id)
            .await?
            .is_some_and(|roles| roles.get(role.as_str()).is_some_and(|entry| !entry.is_null()));
        if !present {
            return Ok(Removal::NothingSet);
        }

        let patch = scope.touch().delete(role_path(role));
        self.write(scope.member.id, &patch).await?;

        info!(role = %role, "Preference removed");
        Ok(Removal::Removed)
    }

    /// Delete the whole role map if anything is set
    #[instrument(skip(self, scope), fields(member_id = %scope.member.id))]
    pub async fn clear(&self, scope: &MemberScope) -> ServiceResult<Removal> {
        let present = self
            .raw_roles(scope.member.id)
            .await?
            .is_some_and(|roles| roles.values().any(|entry| !entry.is_null()));
        if !present {
            return Ok(Removal::NothingSet);
        }

        let patch = scope.touch().delete(ROLES_PATH);
        self.write(scope.member.id, &patch).await?;

        info!("Preferences cleared");
        Ok(Removal::Removed)
    }

    /// Parse, validate and merge an exported preferences string
    ///
    /// All pairs are validated before anything is written; one unknown role or
    /// label rejects the whole import.
    #[instrument(skip(self, scope, raw), fields(member_id = %scope.member.id))]
    pub async fn import(&self, scope: &MemberScope, raw: &str) -> ServiceResult<RolePreferences> {
        let pairs = parse_preference_string(raw).map_err(DomainError::from)?;

        let mut accepted = Vec::with_capacity(pairs.len());
        let mut rejected = Vec::new();
        for (key, label) in &pairs {
            let role = RoleKey::from_key(&key.to_lowercase());
            let rank = Rank::from_label(&label.trim().to_lowercase());
            match (role, rank) {
                (Some(role), Some(rank)) => accepted.push((role, rank)),
                _ => rejected.push(format!("{key}={label}")),
            }
        }
        if !rejected.is_empty() {
            return Err(DomainError::RejectedPairs(rejected).into());
        }

        let now = Utc::now();
        let mut imported = RolePreferences::new();
        let mut patch = scope.touch();
        for (role, rank) in accepted {
            let entry = PreferenceEntry::new(rank, now);
            patch = patch.set(role_path(role), entry.to_value()?);
            imported.insert(role, entry);
        }

        self.write(scope.member.id, &patch).await?;

        info!(count = imported.len(), "Preferences imported");
        Ok(imported)
    }

    /// Raw `preferences.roles` object: `None` when no map was ever written or it was cleared
    async fn raw_roles(&self, member_id: Snowflake) -> ServiceResult<Option<Map<String, Value>>> {
        let document = self
            .ctx
            .store()
            .get(MEMBERS_COLLECTION, &member_id.to_string())
            .await?;

        Ok(document.and_then(|doc| {
            FieldPath::parse(ROLES_PATH)
                .lookup(&doc)
                .and_then(Value::as_object)
                .cloned()
        }))
    }

    async fn write(&self, member_id: Snowflake, patch: &DocumentPatch) -> ServiceResult<()> {
        self.ctx
            .store()
            .apply(MEMBERS_COLLECTION, &member_id.to_string(), patch)
            .await?;
        Ok(())
    }
}
