//! Domain entities - core business objects

mod log_record;
mod member;
mod preference;
mod provisioning;

pub use log_record::LogRecord;
pub use member::{fields as member_fields, MemberPatch, MemberRecord};
pub use preference::{role_path, PreferenceEntry, Preferences, RolePreferences, ROLES_PATH};
pub use provisioning::{ProvisioningReport, StepStatus};
