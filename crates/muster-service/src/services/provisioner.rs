//! Resource provisioner
//!
//! Builds a new member's private onboarding space: the shared recruiter role,
//! the shared category, a private text channel and the greeting inside it.
//! Steps run in order and fail independently; nothing is rolled back.

use chrono::Utc;
use muster_core::entities::{ProvisioningReport, StepStatus};
use muster_core::traits::{ChannelKind, ChannelRef, CreateChannel, RoleRef};
use muster_core::value_objects::{OverwriteTarget, PermissionOverwrite, Permissions};
use muster_core::MemberRef;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::messages;

/// Channel names are capped at this many characters
const MAX_CHANNEL_NAME: usize = 100;

/// What one provisioning run produced
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub report: ProvisioningReport,
    pub role: Option<RoleRef>,
    pub channel: Option<ChannelRef>,
}

/// Resource provisioner
pub struct ResourceProvisioner<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ResourceProvisioner<'a> {
    /// Create a new ResourceProvisioner
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Find the shared recruiter role, creating it if absent
    #[instrument(skip(self))]
    pub async fn ensure_role(&self) -> ServiceResult<RoleRef> {
        let guild_id = self.ctx.guild_id();
        let name = &self.ctx.onboarding().role_name;

        let _guard = self.ctx.singleton_lock().lock().await;
        if let Some(role) = self.ctx.platform().find_role_by_name(guild_id, name).await? {
            return Ok(role);
        }

        let role = self.ctx.platform().create_role(guild_id, name).await?;
        info!(role_id = %role.id, name = %role.name, "Created shared role");
        Ok(role)
    }

    /// Find the shared onboarding category, creating it if absent
    ///
    /// A new category is hidden from everyone except holders of `role`.
    #[instrument(skip(self, role))]
    pub async fn ensure_category(&self, role: &RoleRef) -> ServiceResult<ChannelRef> {
        let guild_id = self.ctx.guild_id();
        let name = &self.ctx.onboarding().category_name;

        let _guard = self.ctx.singleton_lock().lock().await;
        if let Some(category) = self
            .ctx
            .platform()
            .find_channel_by_name(guild_id, name, ChannelKind::Category)
            .await?
        {
            return Ok(category);
        }

        let request = CreateChannel::new(name.clone(), ChannelKind::Category)
            .overwrite(PermissionOverwrite::hide_from_everyone(guild_id))
            .overwrite(PermissionOverwrite::allow(
                OverwriteTarget::Role(role.id),
                Permissions::PARTICIPATE,
            ));
        let category = self.ctx.platform().create_channel(guild_id, &request).await?;

        info!(channel_id = %category.id, name = %category.name, "Created shared category");
        Ok(category)
    }

    /// Ensure both shared resources exist before any member joins
    #[instrument(skip(self))]
    pub async fn preprovision(&self) -> ServiceResult<(RoleRef, ChannelRef)> {
        let role = self.ensure_role().await?;
        let category = self.ensure_category(&role).await?;
        Ok((role, category))
    }

    /// Run every provisioning step for a member who just joined
    #[instrument(skip(self, member), fields(member_id = %member.id))]
    pub async fn provision(&self, member: &MemberRef) -> ProvisionOutcome {
        let guild_id = self.ctx.guild_id();
        let mut report = ProvisioningReport::pending(Utc::now());

        // Shared role
        let role = match self.ensure_role().await {
            Ok(role) => {
                report.role = StepStatus::Done;
                Some(role)
            }
            Err(e) => {
                warn!(error = %e, "Failed to ensure shared role");
                report.role = StepStatus::Failed;
                None
            }
        };

        // Shared category
        let category = match &role {
            Some(role) => match self.ensure_category(role).await {
                Ok(category) => {
                    report.container = StepStatus::Done;
                    Some(category)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to ensure shared category");
                    report.container = StepStatus::Failed;
                    None
                }
            },
            None => {
                report.container = StepStatus::Skipped;
                None
            }
        };

        // Private channel; without the category it lands at the top level
        let channel = match &role {
            Some(role) => {
                let mut request = CreateChannel::new(channel_name(member), ChannelKind::Text)
                    .topic(format!("Onboarding channel for {} ({})", member.display_name, member.id))
                    .overwrite(PermissionOverwrite::allow(
                        OverwriteTarget::Member(member.id),
                        Permissions::PARTICIPATE,
                    ))
                    .overwrite(PermissionOverwrite::hide_from_everyone(guild_id))
                    .overwrite(PermissionOverwrite::allow(
                        OverwriteTarget::Role(role.id),
                        Permissions::PARTICIPATE,
                    ));
                if let Some(category) = &category {
                    request = request.parent(category.id);
                }

                match self.ctx.platform().create_channel(guild_id, &request).await {
                    Ok(channel) => {
                        report.channel = StepStatus::Done;
                        report.channel_id = Some(channel.id);
                        Some(channel)
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to create onboarding channel");
                        report.channel = StepStatus::Failed;
                        None
                    }
                }
            }
            None => {
                report.channel = StepStatus::Skipped;
                None
            }
        };

        // Greeting
        report.greeting = match &channel {
            Some(channel) => {
                let greeting = messages::welcome(&member.mention());
                match self.ctx.platform().send_channel_message(channel.id, &greeting).await {
                    Ok(()) => StepStatus::Done,
                    Err(e) => {
                        warn!(error = %e, channel_id = %channel.id, "Failed to post greeting");
                        StepStatus::Failed
                    }
                }
            }
            None => StepStatus::Skipped,
        };

        report.updated_at = Utc::now();
        info!(
            role = ?report.role,
            container = ?report.container,
            channel = ?report.channel,
            greeting = ?report.greeting,
            "Provisioning finished"
        );

        ProvisionOutcome { report, role, channel }
    }
}

/// Channel name derived from the member's display name
///
/// Lowercase, spaces become dashes, anything else outside `[a-z0-9_-]` is
/// dropped. Falls back to `member-<id>` when nothing usable remains.
pub fn channel_name(member: &MemberRef) -> String {
    let name: String = member
        .display_name
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| match c {
            ' ' => Some('-'),
            'a'..='z' | '0'..='9' | '-' | '_' => Some(c),
            _ => None,
        })
        .take(MAX_CHANNEL_NAME)
        .collect();

    if name.trim_matches('-').is_empty() {
        format!("member-{}", member.id)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_context, PlatformCall, TEST_GUILD};
    use muster_core::Snowflake;

    fn member(name: &str) -> MemberRef {
        MemberRef::new(Snowflake::new(42), "recruit", name)
    }

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_name(&member("John Smith")), "john-smith");
        assert_eq!(channel_name(&member("Ace_Pilot-7")), "ace_pilot-7");
        assert_eq!(channel_name(&member("Zoë!")), "zo");
        assert_eq!(channel_name(&member("!!!")), "member-42");
        assert_eq!(channel_name(&member(&"a".repeat(150))).len(), MAX_CHANNEL_NAME);
    }

    #[tokio::test]
    async fn test_first_join_creates_everything() {
        let (ctx, _, platform) = test_context();
        let outcome = ResourceProvisioner::new(&ctx).provision(&member("Recruit")).await;

        assert!(outcome.report.is_complete());
        assert_eq!(platform.roles().len(), 1);
        assert_eq!(platform.channels(ChannelKind::Category).len(), 1);

        let channels = platform.channels(ChannelKind::Text);
        assert_eq!(channels.len(), 1);
        let created = &channels[0];
        assert_eq!(created.channel.name, "recruit");
        assert_eq!(
            created.request.parent_id,
            Some(platform.channels(ChannelKind::Category)[0].channel.id)
        );
        assert_eq!(created.request.overwrites.len(), 3);
        assert_eq!(outcome.report.channel_id, Some(created.channel.id));

        let messages = platform.channel_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, created.channel.id);
        assert!(messages[0].1.contains("<@42>"));
    }

    #[tokio::test]
    async fn test_existing_singletons_are_reused() {
        let (ctx, _, platform) = test_context();
        platform.with_role("ncg/recruitment");
        platform.with_channel(TEST_GUILD, "welcome", ChannelKind::Category);

        let provisioner = ResourceProvisioner::new(&ctx);
        provisioner.provision(&member("Recruit")).await;
        provisioner.provision(&member("Recruit")).await;

        assert_eq!(platform.calls(PlatformCall::CreateRole), 0);
        assert_eq!(platform.roles().len(), 1);
        assert_eq!(platform.channels(ChannelKind::Category).len(), 1);
        assert_eq!(platform.channels(ChannelKind::Text).len(), 2);
    }

    #[tokio::test]
    async fn test_role_failure_skips_dependents() {
        let (ctx, _, platform) = test_context();
        platform.fail(PlatformCall::CreateRole);

        let outcome = ResourceProvisioner::new(&ctx).provision(&member("Recruit")).await;

        assert_eq!(outcome.report.role, StepStatus::Failed);
        assert_eq!(outcome.report.container, StepStatus::Skipped);
        assert_eq!(outcome.report.channel, StepStatus::Skipped);
        assert_eq!(outcome.report.greeting, StepStatus::Skipped);
        assert_eq!(platform.calls(PlatformCall::CreateChannel), 0);
    }

    #[tokio::test]
    async fn test_greeting_failure_keeps_channel() {
        let (ctx, _, platform) = test_context();
        platform.fail(PlatformCall::ChannelMessage);

        let outcome = ResourceProvisioner::new(&ctx).provision(&member("Recruit")).await;

        assert_eq!(outcome.report.channel, StepStatus::Done);
        assert_eq!(outcome.report.greeting, StepStatus::Failed);
        assert!(outcome.channel.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_first_joins_share_singletons() {
        let (ctx, _, platform) = test_context();
        let provisioner = ResourceProvisioner::new(&ctx);

        let a = member("Alpha");
        let b = MemberRef::new(Snowflake::new(43), "bravo", "Bravo");
        let (first, second) = tokio::join!(provisioner.provision(&a), provisioner.provision(&b));

        assert!(first.report.is_complete());
        assert!(second.report.is_complete());
        assert_eq!(platform.calls(PlatformCall::CreateRole), 1);
        assert_eq!(platform.channels(ChannelKind::Category).len(), 1);
        assert_eq!(platform.channels(ChannelKind::Text).len(), 2);
    }
}
