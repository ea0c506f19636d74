//! Test fixtures and data generators
//!
//! Provides reusable members and command invocations for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use muster_core::{MemberRef, Snowflake};
use muster_service::{CommandInvocation, OptionValue};

/// Guild every test context serves
pub const GUILD: Snowflake = Snowflake::new(1000);

/// Display name of that guild
pub const GUILD_NAME: &str = "UAGPMC";

/// Counter for unique member ids; shared stores outlive a single test
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique member id
pub fn unique_id() -> Snowflake {
    let suffix = COUNTER.fetch_add(1, Ordering::SeqCst);
    Snowflake::new(900_000_000_000_000_000 + u64::from(std::process::id()) * 1_000_000 + suffix)
}

/// A member with a fresh id
pub fn recruit() -> MemberRef {
    member(unique_id(), "Recruit")
}

pub fn member(id: Snowflake, display_name: &str) -> MemberRef {
    MemberRef::new(id, display_name.to_lowercase(), display_name)
}

/// Builder for `/preferences` invocations issued by one member
pub struct Preferences<'a> {
    user: &'a MemberRef,
}

impl<'a> Preferences<'a> {
    pub fn by(user: &'a MemberRef) -> Self {
        Self { user }
    }

    fn base(&self) -> CommandInvocation {
        CommandInvocation::new("preferences", self.user.clone()).in_guild(GUILD, Some(GUILD_NAME.to_string()))
    }

    fn roles(&self, subcommand: &str) -> CommandInvocation {
        self.base().group("roles").subcommand(subcommand)
    }

    pub fn list(&self) -> CommandInvocation {
        self.roles("list")
    }

    pub fn set(&self, role: &str, preference: i64) -> CommandInvocation {
        self.roles("set")
            .option("role", OptionValue::String(role.to_string()))
            .option("preference", OptionValue::Integer(preference))
    }

    pub fn get(&self) -> CommandInvocation {
        self.roles("get")
    }

    pub fn remove(&self, role: &str) -> CommandInvocation {
        self.roles("remove")
            .option("role", OptionValue::String(role.to_string()))
    }

    pub fn clear(&self) -> CommandInvocation {
        self.roles("clear")
    }

    pub fn import(&self, raw: &str) -> CommandInvocation {
        self.base()
            .subcommand("import")
            .option("preferences_string", OptionValue::String(raw.to_string()))
    }

    pub fn help(&self) -> CommandInvocation {
        self.base().subcommand("help")
    }
}

/// `/apply` with every option filled in
pub fn application(user: &MemberRef, name: &str, age: i64) -> CommandInvocation {
    CommandInvocation::new("apply", user.clone())
        .in_guild(GUILD, Some(GUILD_NAME.to_string()))
        .option("name", OptionValue::String(name.to_string()))
        .option("age", OptionValue::Integer(age))
        .option("country", OptionValue::String("Finland".to_string()))
        .option("used-ace", OptionValue::Boolean(true))
        .option("used-acre-or-tfar", OptionValue::Boolean(true))
        .option("returning-member", OptionValue::Boolean(false))
}
