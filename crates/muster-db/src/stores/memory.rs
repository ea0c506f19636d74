//! In-memory implementation of DocumentStore
//!
//! Backs `STORE_BACKEND=memory` and the test suites. Each patch runs while
//! holding the map entry, which gives the same per-document atomicity as the
//! Postgres row lock.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, instrument};

use muster_core::document::DocumentPatch;
use muster_core::traits::{DocumentStore, PatchOutcome, RepoResult};

type DocumentKey = (String, String);

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<DocumentKey, Value>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.documents
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .count()
    }

    /// Every document in a collection, in no particular order
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.documents
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn key(collection: &str, id: &str) -> DocumentKey {
        (collection.to_string(), id.to_string())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> RepoResult<Option<Value>> {
        Ok(self
            .documents
            .get(&Self::key(collection, id))
            .map(|doc| doc.value().clone()))
    }

    #[instrument(skip(self, patch), fields(ops = patch.len()))]
    async fn apply(&self, collection: &str, id: &str, patch: &DocumentPatch) -> RepoResult<PatchOutcome> {
        let outcome = match self.documents.entry(Self::key(collection, id)) {
            Entry::Occupied(mut entry) => {
                let document = patch.apply(entry.get(), false)?;
                entry.insert(document.clone());
                PatchOutcome { inserted: false, document }
            }
            Entry::Vacant(entry) => {
                let document = patch.apply(&Value::Null, true)?;
                entry.insert(document.clone());
                PatchOutcome { inserted: true, document }
            }
        };

        debug!(collection, id, inserted = outcome.inserted, "Patched document");
        Ok(outcome)
    }

    async fn insert(&self, collection: &str, id: &str, document: Value) -> RepoResult<()> {
        self.documents.insert(Self::key(collection, id), document);
        Ok(())
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_core::DomainError;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_apply_reports_insert_once() {
        let store = MemoryDocumentStore::new();
        let patch = DocumentPatch::new()
            .set("id", json!("1"))
            .set_on_insert("insertedAt", json!("2024-01-01T00:00:00Z"));

        let first = store.apply("members", "1", &patch).await.unwrap();
        assert!(first.inserted);

        let second = store
            .apply("members", "1", &DocumentPatch::new().set_on_insert("insertedAt", json!("later")))
            .await
            .unwrap();
        assert!(!second.inserted);
        assert_eq!(second.document["insertedAt"], json!("2024-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_failed_patch_writes_nothing() {
        let store = MemoryDocumentStore::new();
        store.insert("members", "1", json!({ "messageCount": "lots" })).await.unwrap();

        let patch = DocumentPatch::new()
            .set("lastKnownDisplayName", json!("Recruit"))
            .increment("messageCount", 1);
        let err = store.apply("members", "1", &patch).await.unwrap_err();
        assert!(matches!(err, DomainError::PatchRejected(_)));

        let doc = store.get("members", "1").await.unwrap().unwrap();
        assert_eq!(doc, json!({ "messageCount": "lots" }));
    }

    #[tokio::test]
    async fn test_failed_patch_on_new_document_creates_nothing() {
        let store = MemoryDocumentStore::new();
        let patch = DocumentPatch::new()
            .set("a", json!(1))
            .append("a", json!(2));

        assert!(store.apply("members", "9", &patch).await.is_err());
        assert!(store.get("members", "9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryDocumentStore::new());

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let store = Arc::clone(&store);
                let delta = if i % 4 == 3 { -1 } else { 1 };
                tokio::spawn(async move {
                    store
                        .apply("members", "7", &DocumentPatch::new().increment("messageCount", delta))
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let doc = store.get("members", "7").await.unwrap().unwrap();
        assert_eq!(doc["messageCount"], json!(48 - 16));
    }

    #[tokio::test]
    async fn test_collections_are_separate() {
        let store = MemoryDocumentStore::new();
        store.insert("logs", "a", json!({ "message": "hi" })).await.unwrap();
        store.insert("members", "a", json!({ "id": "a" })).await.unwrap();

        assert_eq!(store.count("logs"), 1);
        assert_eq!(store.documents("members"), vec![json!({ "id": "a" })]);
    }
}
