//! Value objects - immutable types with validation

mod permissions;
mod rank;
mod role_key;
mod snowflake;

pub use permissions::{OverwriteTarget, PermissionOverwrite, Permissions};
pub use rank::Rank;
pub use role_key::RoleKey;
pub use snowflake::{Snowflake, SnowflakeParseError};
