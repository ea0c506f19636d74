//! Member directory
//!
//! Authoritative per-member records. Mutation is upsert-only: every write is a
//! declarative [`MemberPatch`] applied atomically to the member's document.

use muster_core::entities::{MemberPatch, MemberRecord};
use muster_core::traits::PatchOutcome;
use muster_core::{DomainError, Snowflake, MEMBERS_COLLECTION};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Member directory service
pub struct MemberDirectory<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberDirectory<'a> {
    /// Create a new MemberDirectory
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply `patch` to the member's record, creating it if needed
    #[instrument(skip(self, patch))]
    pub async fn upsert(&self, member_id: Snowflake, patch: MemberPatch) -> ServiceResult<PatchOutcome> {
        let patch = patch.into_document_patch(member_id);
        let outcome = self
            .ctx
            .store()
            .apply(MEMBERS_COLLECTION, &member_id.to_string(), &patch)
            .await?;

        debug!(member_id = %member_id, inserted = outcome.inserted, "Member record upserted");
        Ok(outcome)
    }

    /// Read a member's record
    #[instrument(skip(self))]
    pub async fn get(&self, member_id: Snowflake) -> ServiceResult<Option<MemberRecord>> {
        let id = member_id.to_string();
        let Some(document) = self.ctx.store().get(MEMBERS_COLLECTION, &id).await? else {
            return Ok(None);
        };

        let record = serde_json::from_value(document).map_err(|e| DomainError::CorruptDocument {
            collection: MEMBERS_COLLECTION.to_string(),
            id,
            reason: e.to_string(),
        })?;

        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_context;
    use chrono::Utc;
    use muster_core::traits::DocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let (ctx, _, _) = test_context();
        let directory = MemberDirectory::new(&ctx);
        let id = Snowflake::new(42);
        let now = Utc::now();

        let first = directory
            .upsert(id, MemberPatch::new().touch("Recruit").inserted_at(now).record_join(now))
            .await
            .unwrap();
        assert!(first.inserted);

        directory
            .upsert(id, MemberPatch::new().touch("Rifleman").adjust_message_count(1))
            .await
            .unwrap();

        let record = directory.get(id).await.unwrap().unwrap();
        assert_eq!(record.last_known_display_name, "Rifleman");
        assert_eq!(record.message_count, 1);
        assert_eq!(record.join_history.len(), 1);
        assert_eq!(record.inserted_at.map(|t| t.timestamp()), Some(now.timestamp()));
    }

    #[tokio::test]
    async fn test_get_missing_member() {
        let (ctx, _, _) = test_context();
        assert!(MemberDirectory::new(&ctx).get(Snowflake::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_corrupt_record() {
        let (ctx, store, _) = test_context();
        store
            .insert(MEMBERS_COLLECTION, "5", json!({ "id": "5", "messageCount": "many" }))
            .await
            .unwrap();

        let err = MemberDirectory::new(&ctx).get(Snowflake::new(5)).await.unwrap_err();
        assert_eq!(err.error_code(), "CORRUPT_DOCUMENT");
    }
}
