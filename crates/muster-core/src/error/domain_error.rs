//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::document::PatchError;
use crate::parser::ParseError;
use crate::traits::PlatformError;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Member not found: {0}")]
    MemberNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown preference level: {0}")]
    UnknownRank(String),

    #[error("Invalid preferences string: {0}")]
    InvalidPreferenceString(#[from] ParseError),

    /// Import pairs that fall outside the role or level vocabulary
    #[error("Unrecognised preferences: {}", .0.join(", "))]
    RejectedPairs(Vec<String>),

    // =========================================================================
    // Document Errors
    // =========================================================================
    #[error("Patch rejected: {0}")]
    PatchRejected(#[from] PatchError),

    #[error("Failed to encode document field: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Corrupt document {collection}/{id}: {reason}")]
    CorruptDocument {
        collection: String,
        id: String,
        reason: String,
    },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for logs and replies
    pub fn code(&self) -> &'static str {
        match self {
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::UnknownRole(_) => "UNKNOWN_ROLE",
            Self::UnknownRank(_) => "UNKNOWN_RANK",
            Self::InvalidPreferenceString(_) => "INVALID_PREFERENCE_STRING",
            Self::RejectedPairs(_) => "REJECTED_PREFERENCES",

            Self::PatchRejected(_) => "PATCH_REJECTED",
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::CorruptDocument { .. } => "CORRUPT_DOCUMENT",

            Self::PersistenceUnavailable(_) => "PERSISTENCE_UNAVAILABLE",
            Self::PlatformError(_) => "PLATFORM_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error was caused by user input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::UnknownRole(_)
                | Self::UnknownRank(_)
                | Self::InvalidPreferenceString(_)
                | Self::RejectedPairs(_)
        )
    }

    /// Check if this is a storage failure
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::PersistenceUnavailable(_) | Self::CorruptDocument { .. }
        )
    }
}

impl From<PlatformError> for DomainError {
    fn from(err: PlatformError) -> Self {
        Self::PlatformError(err.to_string())
    }
}
