//! # muster-core
//!
//! Domain layer containing member records, preference types, document patches,
//! lifecycle events and the ports to the document store and chat platform.
//! This crate has zero dependencies on infrastructure (database, HTTP, gateway).

pub mod document;
pub mod entities;
pub mod error;
pub mod events;
pub mod parser;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use document::{DocumentPatch, FieldOp, FieldPath, PatchError, LOGS_COLLECTION, MEMBERS_COLLECTION};
pub use entities::{
    member_fields, role_path, LogRecord, MemberPatch, MemberRecord, PreferenceEntry, Preferences,
    ProvisioningReport, RolePreferences, StepStatus, ROLES_PATH,
};
pub use error::DomainError;
pub use events::{LifecycleEvent, MemberRef};
pub use parser::{parse_preference_string, ParseError};
pub use traits::{
    ChannelKind, ChannelRef, CreateChannel, DocumentStore, GuildRef, PatchOutcome, PlatformClient,
    PlatformError, PlatformResult, RepoResult, RoleRef,
};
pub use value_objects::{
    OverwriteTarget, PermissionOverwrite, Permissions, Rank, RoleKey, Snowflake, SnowflakeParseError,
};
