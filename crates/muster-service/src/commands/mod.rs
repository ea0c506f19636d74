//! Slash commands
//!
//! A static registry maps the closed set of [`CommandName`]s to handlers. The
//! platform adapter turns an interaction into a [`CommandInvocation`] and sends
//! back whatever [`Reply`] the registry produces.

mod apply;
mod preferences;

use std::collections::BTreeMap;

use async_trait::async_trait;
use muster_core::{MemberRef, Snowflake};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::services::error::{ServiceError, ServiceResult, GENERIC_FAILURE};
use crate::services::{MemberScope, ServiceContext};

pub use apply::ApplyCommand;
pub use preferences::PreferencesCommand;

/// Reply to a subcommand the registry does not know
pub const UNKNOWN_SUBCOMMAND: &str = "Unknown subcommand.";

/// Application command option types used by the definitions
pub(crate) mod option_type {
    pub const SUB_COMMAND: u8 = 1;
    pub const SUB_COMMAND_GROUP: u8 = 2;
    pub const STRING: u8 = 3;
    pub const INTEGER: u8 = 4;
    pub const BOOLEAN: u8 = 5;
}

/// Every command the bot registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Apply,
    Preferences,
}

impl CommandName {
    pub const ALL: [CommandName; 2] = [Self::Apply, Self::Preferences];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Preferences => "preferences",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.as_str() == name)
    }
}

/// Value of a single command option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

/// One command as issued by a member
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub name: String,
    /// `None` when issued outside a guild
    pub guild_id: Option<Snowflake>,
    pub guild_name: Option<String>,
    pub user: MemberRef,
    pub subcommand_group: Option<String>,
    pub subcommand: Option<String>,
    pub options: BTreeMap<String, OptionValue>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>, user: MemberRef) -> Self {
        Self {
            name: name.into(),
            guild_id: None,
            guild_name: None,
            user,
            subcommand_group: None,
            subcommand: None,
            options: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn in_guild(mut self, guild_id: Snowflake, guild_name: Option<String>) -> Self {
        self.guild_id = Some(guild_id);
        self.guild_name = guild_name;
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.subcommand_group = Some(group.into());
        self
    }

    #[must_use]
    pub fn subcommand(mut self, subcommand: impl Into<String>) -> Self {
        self.subcommand = Some(subcommand.into());
        self
    }

    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.options.get(name) {
            Some(OptionValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.options.get(name) {
            Some(OptionValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn required_string(&self, name: &str) -> ServiceResult<&str> {
        self.string(name)
            .ok_or_else(|| ServiceError::validation(format!("The `{name}` option is required.")))
    }

    pub(crate) fn required_integer(&self, name: &str) -> ServiceResult<i64> {
        self.integer(name)
            .ok_or_else(|| ServiceError::validation(format!("The `{name}` option is required.")))
    }

    pub(crate) fn required_boolean(&self, name: &str) -> ServiceResult<bool> {
        self.boolean(name)
            .ok_or_else(|| ServiceError::validation(format!("The `{name}` option is required.")))
    }

    /// Scope for preference writes; commands outside a guild count for the served guild
    pub(crate) fn scope(&self, ctx: &ServiceContext) -> MemberScope {
        let scope = MemberScope::new(self.guild_id.unwrap_or_else(|| ctx.guild_id()), self.user.clone());
        match &self.guild_name {
            Some(name) => scope.with_guild_name(name.clone()),
            None => scope,
        }
    }
}

/// Message sent back for an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Only visible to the member who issued the command
    pub ephemeral: bool,
}

impl Reply {
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }

    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }
}

/// A slash command handler
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> CommandName;

    /// Application command definition as registered with the platform
    fn definition(&self) -> Value;

    async fn execute(&self, ctx: &ServiceContext, invocation: &CommandInvocation) -> ServiceResult<Reply>;
}

/// Static mapping from command names to handlers
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    /// Registry with every command the bot ships
    pub fn standard() -> Self {
        Self {
            commands: vec![Box::new(ApplyCommand), Box::new(PreferencesCommand)],
        }
    }

    pub fn get(&self, name: CommandName) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|command| command.name() == name)
            .map(|command| &**command)
    }

    /// Definitions of every registered command, for bulk registration
    pub fn definitions(&self) -> Value {
        Value::Array(self.commands.iter().map(|command| command.definition()).collect())
    }

    /// Run an invocation and turn any failure into a reply
    #[instrument(skip(self, ctx, invocation), fields(command = %invocation.name, user_id = %invocation.user.id))]
    pub async fn dispatch(&self, ctx: &ServiceContext, invocation: &CommandInvocation) -> Reply {
        let Some(command) = CommandName::from_name(&invocation.name).and_then(|name| self.get(name)) else {
            warn!("Unknown command");
            return Reply::ephemeral(UNKNOWN_SUBCOMMAND);
        };

        info!(
            group = ?invocation.subcommand_group,
            subcommand = ?invocation.subcommand,
            "Received command"
        );

        match command.execute(ctx, invocation).await {
            Ok(reply) => reply,
            Err(e) if e.is_user_error() => {
                info!(error = %e, "Command rejected input");
                Reply::ephemeral(e.user_message())
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Command failed");
                Reply::ephemeral(e.user_message())
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Reply used when the registry itself cannot produce one
pub fn generic_failure() -> Reply {
    Reply::ephemeral(GENERIC_FAILURE)
}
