//! Document store port
//!
//! A schemaless store of JSON documents grouped into collections. The domain
//! only ever mutates documents through [`DocumentPatch`]es so that concurrent
//! writers touching different fields never clobber each other.

use async_trait::async_trait;
use serde_json::Value;

use crate::document::DocumentPatch;
use crate::error::DomainError;

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

/// What an [`DocumentStore::apply`] call did
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    /// The document did not exist before this call
    pub inserted: bool,
    /// Document contents after the patch
    pub document: Value,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if it does not exist
    async fn get(&self, collection: &str, id: &str) -> RepoResult<Option<Value>>;

    /// Apply a patch atomically, creating the document if it does not exist
    ///
    /// Either every operation of the patch is applied or none is.
    async fn apply(&self, collection: &str, id: &str, patch: &DocumentPatch) -> RepoResult<PatchOutcome>;

    /// Insert a whole document, replacing any existing one with the same id
    async fn insert(&self, collection: &str, id: &str, document: Value) -> RepoResult<()>;

    /// Check the store is reachable
    async fn ping(&self) -> RepoResult<()>;
}
