//! Ready-time housekeeping
//!
//! Runs once per READY: the bot leaves every guild but the one it serves,
//! registers its commands, makes sure the shared role and category exist and
//! writes an audit line. Each step fails on its own.

use muster_core::Snowflake;
use muster_service::{AuditLog, CommandRegistry, ResourceProvisioner, ServiceContext};
use tracing::{info, instrument, warn};

/// What a housekeeping run achieved
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Housekeeping {
    pub left_guilds: Vec<Snowflake>,
    pub commands_registered: bool,
    pub preprovisioned: bool,
}

#[instrument(skip(ctx, registry), fields(guild_id = %ctx.guild_id()))]
pub async fn run(
    ctx: &ServiceContext,
    registry: &CommandRegistry,
    application_id: Snowflake,
    bot_tag: &str,
) -> Housekeeping {
    let mut report = Housekeeping {
        left_guilds: leave_other_guilds(ctx).await,
        ..Housekeeping::default()
    };

    match ctx
        .platform()
        .register_commands(application_id, ctx.guild_id(), &registry.definitions())
        .await
    {
        Ok(()) => {
            info!("Registered application commands");
            report.commands_registered = true;
        }
        Err(e) => warn!(error = %e, "Failed to register application commands"),
    }

    match ResourceProvisioner::new(ctx).preprovision().await {
        Ok((role, category)) => {
            info!(role_id = %role.id, category_id = %category.id, "Onboarding role and category ready");
            report.preprovisioned = true;
        }
        Err(e) => warn!(error = %e, "Failed to pre-provision onboarding role and category"),
    }

    AuditLog::new(ctx).record(format!("{bot_tag} is ready! 🚀")).await;
    report
}

async fn leave_other_guilds(ctx: &ServiceContext) -> Vec<Snowflake> {
    let guilds = match ctx.platform().list_guilds().await {
        Ok(guilds) => guilds,
        Err(e) => {
            warn!(error = %e, "Failed to list guilds");
            return Vec::new();
        }
    };

    let mut left = Vec::new();
    for guild in guilds.into_iter().filter(|guild| guild.id != ctx.guild_id()) {
        match ctx.platform().leave_guild(guild.id).await {
            Ok(()) => {
                info!(guild_id = %guild.id, name = %guild.name, "Left guild");
                left.push(guild.id);
            }
            Err(e) => warn!(guild_id = %guild.id, error = %e, "Failed to leave guild"),
        }
    }
    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_core::{ChannelKind, LOGS_COLLECTION};
    use muster_db::MemoryDocumentStore;
    use muster_service::testing::{PlatformCall, RecordingPlatform};
    use muster_service::ServiceContextBuilder;
    use std::sync::Arc;

    const GUILD: Snowflake = Snowflake::new(1000);
    const APPLICATION: Snowflake = Snowflake::new(77);

    fn context() -> (ServiceContext, Arc<MemoryDocumentStore>, Arc<RecordingPlatform>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let platform = Arc::new(RecordingPlatform::new());
        let ctx = ServiceContextBuilder::new()
            .store(store.clone())
            .platform(platform.clone())
            .guild_id(GUILD)
            .build()
            .unwrap();
        (ctx, store, platform)
    }

    #[tokio::test]
    async fn test_housekeeping() {
        let (ctx, store, platform) = context();
        platform.add_guild(GUILD, "UAGPMC");
        platform.add_guild(Snowflake::new(2000), "Elsewhere");

        let report = run(&ctx, &CommandRegistry::standard(), APPLICATION, "muster#0001").await;

        assert_eq!(report.left_guilds, vec![Snowflake::new(2000)]);
        assert_eq!(platform.left_guilds(), vec![Snowflake::new(2000)]);
        assert!(report.commands_registered);
        assert_eq!(
            platform.registered_commands(),
            Some(CommandRegistry::standard().definitions())
        );
        assert!(report.preprovisioned);
        assert_eq!(platform.roles().len(), 1);
        assert_eq!(platform.channels(ChannelKind::Category).len(), 1);

        let logs = store.documents(LOGS_COLLECTION);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["message"], "muster#0001 is ready! 🚀");
    }

    #[tokio::test]
    async fn test_failed_steps_do_not_stop_the_rest() {
        let (ctx, store, platform) = context();
        platform.fail(PlatformCall::ListGuilds);
        platform.fail(PlatformCall::RegisterCommands);

        let report = run(&ctx, &CommandRegistry::standard(), APPLICATION, "muster").await;

        assert!(report.left_guilds.is_empty());
        assert!(!report.commands_registered);
        assert!(report.preprovisioned);
        assert_eq!(store.count(LOGS_COLLECTION), 1);
    }

    #[tokio::test]
    async fn test_second_ready_reuses_role_and_category() {
        let (ctx, _, platform) = context();
        run(&ctx, &CommandRegistry::standard(), APPLICATION, "muster").await;
        run(&ctx, &CommandRegistry::standard(), APPLICATION, "muster").await;

        assert_eq!(platform.calls(PlatformCall::CreateRole), 1);
        assert_eq!(platform.roles().len(), 1);
        assert_eq!(platform.channels(ChannelKind::Category).len(), 1);
    }
}
