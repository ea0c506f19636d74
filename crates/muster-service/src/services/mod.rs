//! Onboarding and preference services
//!
//! Each service borrows a [`ServiceContext`] and owns one slice of the
//! workflow; the lifecycle orchestrator sequences the others.

pub mod audit;
pub mod context;
pub mod directory;
pub mod error;
pub mod fanout;
pub mod lifecycle;
pub mod messages;
pub mod preferences;
pub mod provisioner;

// Re-export all services for convenience
pub use audit::AuditLog;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use directory::MemberDirectory;
pub use error::{ServiceError, ServiceResult, GENERIC_FAILURE, PERSISTENCE_FAILURE};
pub use fanout::NotificationFanout;
pub use lifecycle::LifecycleOrchestrator;
pub use preferences::{MemberScope, PreferenceService, Removal};
pub use provisioner::{channel_name, ProvisionOutcome, ResourceProvisioner};
