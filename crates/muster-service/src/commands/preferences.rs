//! `/preferences` - role preference management

use async_trait::async_trait;
use muster_core::{Rank, RoleKey};
use serde_json::{json, Value};

use super::{option_type, Command, CommandInvocation, CommandName, Reply, UNKNOWN_SUBCOMMAND};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::{PreferenceService, Removal, ServiceContext};

const NOTHING_SET: &str = "You haven't set any role preferences yet.";

const HELP: &str = "# Preferences Commands Help\nTo use this command, you need to go to the [online generator](https://steppenwauwau.uagpmc.com/preferences-generator.html) and generate a preferences string. Then, you can use the `/preferences import` command and the bot will parse the preferences string and save it to the database.";

pub struct PreferencesCommand;

impl PreferencesCommand {
    fn role_option(description: &str) -> Value {
        let choices: Vec<Value> = RoleKey::ALL
            .iter()
            .map(|role| json!({ "name": role.as_str(), "value": role.as_str() }))
            .collect();

        json!({
            "type": option_type::STRING,
            "name": "role",
            "description": description,
            "required": true,
            "choices": choices,
        })
    }

    fn role(invocation: &CommandInvocation) -> ServiceResult<RoleKey> {
        let key = invocation.required_string("role")?;
        RoleKey::from_key(key).ok_or_else(|| ServiceError::validation(format!("`{key}` is not a known role.")))
    }

    fn list() -> Reply {
        let roles: String = RoleKey::ALL
            .iter()
            .map(|role| format!("**{}**: {}\n", role.as_str(), role.description()))
            .collect();
        Reply::ephemeral(format!("# Available roles:\n\n{roles}"))
    }

    async fn set(ctx: &ServiceContext, invocation: &CommandInvocation) -> ServiceResult<Reply> {
        let role = Self::role(invocation)?;
        let value = invocation.required_integer("preference")?;
        let rank = Rank::from_value(value)
            .ok_or_else(|| ServiceError::validation(format!("`{value}` is not a valid preference.")))?;

        let entry = PreferenceService::new(ctx)
            .set(&invocation.scope(ctx), role, rank)
            .await?;

        Ok(Reply::ephemeral(format!(
            "You set your preference for **{role}** to `{}`",
            entry.last_updated_value_label
        )))
    }

    async fn get(ctx: &ServiceContext, invocation: &CommandInvocation) -> ServiceResult<Reply> {
        let roles = PreferenceService::new(ctx).get(invocation.user.id).await?;
        if roles.is_empty() {
            return Ok(Reply::ephemeral(NOTHING_SET));
        }

        let lines: Vec<String> = roles
            .iter()
            .map(|(role, entry)| format!("**{role}**: {}", entry.rank()))
            .collect();
        Ok(Reply::ephemeral(format!("# Your role preferences:\n\n{}", lines.join("\n"))))
    }

    async fn remove(ctx: &ServiceContext, invocation: &CommandInvocation) -> ServiceResult<Reply> {
        let role = Self::role(invocation)?;
        let content = match PreferenceService::new(ctx).remove(&invocation.scope(ctx), role).await? {
            Removal::Removed => format!("You removed your preference for **{role}**."),
            Removal::NothingSet => format!("You haven't set a preference for **{role}** yet."),
        };
        Ok(Reply::ephemeral(content))
    }

    async fn clear(ctx: &ServiceContext, invocation: &CommandInvocation) -> ServiceResult<Reply> {
        let content = match PreferenceService::new(ctx).clear(&invocation.scope(ctx)).await? {
            Removal::Removed => "You cleared all your role preferences.",
            Removal::NothingSet => NOTHING_SET,
        };
        Ok(Reply::ephemeral(content))
    }

    async fn import(ctx: &ServiceContext, invocation: &CommandInvocation) -> ServiceResult<Reply> {
        let raw = invocation.required_string("preferences_string")?;
        PreferenceService::new(ctx)
            .import(&invocation.scope(ctx), raw)
            .await?;
        Ok(Reply::ephemeral("Preferences imported successfully."))
    }
}

#[async_trait]
impl Command for PreferencesCommand {
    fn name(&self) -> CommandName {
        CommandName::Preferences
    }

    fn definition(&self) -> Value {
        let ranks: Vec<Value> = Rank::ALL
            .iter()
            .map(|rank| json!({ "name": rank.label(), "value": rank.value() }))
            .collect();

        json!({
            "name": CommandName::Preferences.as_str(),
            "description": "Manage your preferences for the unit.",
            "options": [
                {
                    "type": option_type::SUB_COMMAND_GROUP,
                    "name": "roles",
                    "description": "Your in-game role preferences. Use `/preferences roles list` for more information on each role.",
                    "options": [
                        {
                            "type": option_type::SUB_COMMAND,
                            "name": "list",
                            "description": "List all available roles and their descriptions.",
                        },
                        {
                            "type": option_type::SUB_COMMAND,
                            "name": "set",
                            "description": "Set your role preferences.",
                            "options": [
                                Self::role_option("The role you want to set."),
                                {
                                    "type": option_type::INTEGER,
                                    "name": "preference",
                                    "description": "Your preference for this role.",
                                    "required": true,
                                    "choices": ranks,
                                },
                            ],
                        },
                        {
                            "type": option_type::SUB_COMMAND,
                            "name": "get",
                            "description": "Get your role preferences.",
                        },
                        {
                            "type": option_type::SUB_COMMAND,
                            "name": "remove",
                            "description": "Remove a role preference.",
                            "options": [Self::role_option("The role you want to remove.")],
                        },
                        {
                            "type": option_type::SUB_COMMAND,
                            "name": "clear",
                            "description": "Clear all your role preferences.",
                        },
                    ],
                },
                {
                    "type": option_type::SUB_COMMAND,
                    "name": "help",
                    "description": "Get help with the preferences command.",
                },
                {
                    "type": option_type::SUB_COMMAND,
                    "name": "import",
                    "description": "Import your preferences from the online generator.",
                    "options": [
                        {
                            "type": option_type::STRING,
                            "name": "preferences_string",
                            "description": "The preferences string exported from the online generator.",
                            "required": true,
                        },
                    ],
                },
            ],
        })
    }

    async fn execute(&self, ctx: &ServiceContext, invocation: &CommandInvocation) -> ServiceResult<Reply> {
        match (invocation.subcommand_group.as_deref(), invocation.subcommand.as_deref()) {
            (Some("roles"), Some("list")) => Ok(Self::list()),
            (Some("roles"), Some("set")) => Self::set(ctx, invocation).await,
            (Some("roles"), Some("get")) => Self::get(ctx, invocation).await,
            (Some("roles"), Some("remove")) => Self::remove(ctx, invocation).await,
            (Some("roles"), Some("clear")) => Self::clear(ctx, invocation).await,
            (None, Some("help")) => Ok(Reply::public(HELP)),
            (None, Some("import")) => Self::import(ctx, invocation).await,
            _ => Ok(Reply::ephemeral(UNKNOWN_SUBCOMMAND)),
        }
    }
}
