//! Error handling utilities for document stores

use muster_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::PersistenceUnavailable(e.to_string())
}

/// A stored document could not be read back
pub fn corrupt_document(collection: &str, id: &str, reason: impl ToString) -> DomainError {
    DomainError::CorruptDocument {
        collection: collection.to_string(),
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
