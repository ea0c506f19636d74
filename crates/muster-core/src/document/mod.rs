//! Schemaless documents and field-level patches

mod patch;
mod path;

pub use patch::{DocumentPatch, FieldOp, PatchError};
pub use path::FieldPath;

/// Collection holding one record per member
pub const MEMBERS_COLLECTION: &str = "members";

/// Append-only collection of timestamped log lines
pub const LOGS_COLLECTION: &str = "logs";
