//! Service layer error types
//!
//! Provides a unified error type for all service operations and decides what a
//! member gets to see when a command fails.

use muster_common::AppError;
use muster_core::{DomainError, PlatformError};
use std::fmt;

/// Reply shown when a command fails for a reason the member cannot act on
pub const GENERIC_FAILURE: &str = "Something went wrong! 😔";

/// Reply shown when a preference write could not be persisted
pub const PERSISTENCE_FAILURE: &str =
    "Your preferences could not be saved right now. Please try again in a few minutes.";

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or store failure
    Domain(DomainError),

    /// Chat platform call failed
    Platform(PlatformError),

    /// Application error
    App(AppError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Member input rejected; the message is shown to the member as-is
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::Platform(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Platform(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Platform(_) => "PLATFORM_ERROR",
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure is the member's to fix (bad input)
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_validation(),
            Self::Validation(_) => true,
            _ => false,
        }
    }

    /// Text to show the member who triggered the failing command
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Domain(DomainError::RejectedPairs(pairs)) => format!(
                "Some preferences were not recognised: {}. Use the role keys from `/preferences roles list` and the levels `never`, `sometimes` or `always`. Nothing was imported.",
                pairs.join(", ")
            ),
            Self::Domain(DomainError::InvalidPreferenceString(e)) => {
                format!("That preferences string could not be read: {e}. Nothing was imported.")
            }
            Self::Domain(e) if e.is_validation() => e.to_string(),
            Self::Domain(e) if e.is_persistence() => PERSISTENCE_FAILURE.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<PlatformError> for ServiceError {
    fn from(err: PlatformError) -> Self {
        Self::Platform(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::Platform(e) => AppError::Platform(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => AppError::NotFound(format!("{resource} {id}")),
            ServiceError::Validation(msg) => AppError::Domain(DomainError::ValidationError(msg)),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
