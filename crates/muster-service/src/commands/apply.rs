//! `/apply` - submit an application to the recruiters

use async_trait::async_trait;
use muster_core::traits::ChannelKind;
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use super::{option_type, Command, CommandInvocation, CommandName, Reply};
use crate::dto::{validation_message, ApplicationForm};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::ServiceContext;

pub struct ApplyCommand;

impl ApplyCommand {
    fn form(invocation: &CommandInvocation) -> ServiceResult<ApplicationForm> {
        let form = ApplicationForm {
            name: invocation.required_string("name")?.trim().to_string(),
            age: invocation.required_integer("age")?,
            country: invocation.required_string("country")?.trim().to_string(),
            used_ace: invocation.required_boolean("used-ace")?,
            used_acre_or_tfar: invocation.required_boolean("used-acre-or-tfar")?,
            returning_member: invocation.required_boolean("returning-member")?,
        };

        form.validate()
            .map_err(|errors| ServiceError::validation(validation_message(&errors)))?;
        Ok(form)
    }
}

#[async_trait]
impl Command for ApplyCommand {
    fn name(&self) -> CommandName {
        CommandName::Apply
    }

    fn definition(&self) -> Value {
        let option = |kind: u8, name: &str, description: &str| {
            json!({ "type": kind, "name": name, "description": description, "required": true })
        };

        json!({
            "name": CommandName::Apply.as_str(),
            "description": "Start the application process to join the unit.",
            "options": [
                option(option_type::STRING, "name", "Your in-game name."),
                option(option_type::INTEGER, "age", "Your age."),
                option(option_type::STRING, "country", "The country you're in."),
                option(option_type::BOOLEAN, "used-ace", "Have you used the ACE mod before?"),
                option(option_type::BOOLEAN, "used-acre-or-tfar", "Have you used ACRE or TFAR before?"),
                option(option_type::BOOLEAN, "returning-member", "Are you a returning member?"),
            ],
        })
    }

    async fn execute(&self, ctx: &ServiceContext, invocation: &CommandInvocation) -> ServiceResult<Reply> {
        let form = Self::form(invocation)?;

        let channel_name = &ctx.onboarding().applications_channel;
        let channel = ctx
            .platform()
            .find_channel_by_name(ctx.guild_id(), channel_name, ChannelKind::Text)
            .await?
            .ok_or_else(|| ServiceError::not_found("Channel", channel_name.clone()))?;

        let pretty = form
            .to_pretty_json()
            .map_err(|e| ServiceError::internal(e.to_string()))?;
        let post = format!(
            "New application from {}:\n\n```json\n{pretty}```",
            invocation.user.mention()
        );
        ctx.platform().send_channel_message(channel.id, &post).await?;

        info!(user_id = %invocation.user.id, "Application submitted");
        Ok(Reply::ephemeral(
            "Your application has been received! A member of our recruitment team will reach out to you soon.",
        ))
    }
}
