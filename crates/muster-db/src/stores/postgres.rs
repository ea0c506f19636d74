//! PostgreSQL implementation of DocumentStore
//!
//! Documents live in one JSONB table keyed by `(collection, id)`. Patches are
//! applied in Rust inside a transaction that holds the row lock, so concurrent
//! patches to the same document are serialized by Postgres.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, instrument};

use muster_core::document::DocumentPatch;
use muster_core::traits::{DocumentStore, PatchOutcome, RepoResult};

use super::error::{corrupt_document, map_db_error};

/// PostgreSQL implementation of DocumentStore
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new PgDocumentStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> RepoResult<Option<Value>> {
        sqlx::query_scalar::<_, Value>(
            r#"
            SELECT data FROM documents WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::ColumnDecode { source, .. } => corrupt_document(collection, id, source),
            other => map_db_error(other),
        })
    }

    #[instrument(skip(self, patch), fields(ops = patch.len()))]
    async fn apply(&self, collection: &str, id: &str, patch: &DocumentPatch) -> RepoResult<PatchOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, '{}'::jsonb)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected()
            == 1;

        let current = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Dropping the transaction on error rolls back the placeholder insert too
        let document = patch.apply(&current, inserted)?;

        sqlx::query(
            r#"
            UPDATE documents SET data = $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&document)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(collection, id, inserted, "Patched document");
        Ok(PatchOutcome { inserted, document })
    }

    #[instrument(skip(self, document))]
    async fn insert(&self, collection: &str, id: &str, document: Value) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&document)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
