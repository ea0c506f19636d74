//! Lifecycle orchestrator
//!
//! Turns membership and message events into directory updates and onboarding
//! side effects. Each step's failure is logged and isolated; nothing here is
//! retried and no workflow state is kept beyond the directory.

use chrono::Utc;
use muster_core::entities::{MemberPatch, ProvisioningReport};
use muster_core::{LifecycleEvent, MemberRef, Snowflake};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::directory::MemberDirectory;
use super::fanout::NotificationFanout;
use super::messages;
use super::provisioner::ResourceProvisioner;

/// Lifecycle orchestrator
pub struct LifecycleOrchestrator<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LifecycleOrchestrator<'a> {
    /// Create a new LifecycleOrchestrator
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Route an event to its workflow
    pub async fn handle(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::MemberJoined { guild_id, member } => {
                if self.is_served(guild_id) {
                    self.on_join(&member).await;
                }
            }
            LifecycleEvent::MemberLeft { guild_id, member } => {
                if self.is_served(guild_id) {
                    self.on_leave(&member).await;
                }
            }
            LifecycleEvent::MessageCreated { author, .. } => self.on_message_created(&author).await,
            LifecycleEvent::MessageDeleted {
                message_id, author, ..
            } => self.on_message_deleted(message_id, author.as_ref()).await,
        }
    }

    fn is_served(&self, guild_id: Snowflake) -> bool {
        let served = guild_id == self.ctx.guild_id();
        if !served {
            debug!(guild_id = %guild_id, "Ignoring event from another guild");
        }
        served
    }

    /// Record the join, provision the member's space and alert recruiters
    #[instrument(skip(self, member), fields(member_id = %member.id))]
    pub async fn on_join(&self, member: &MemberRef) -> ProvisioningReport {
        let directory = MemberDirectory::new(self.ctx);
        let now = Utc::now();

        // Directory first; it is an audit trail, not a gate
        let patch = MemberPatch::new()
            .touch(member.display_name.clone())
            .inserted_at(now)
            .record_join(now);
        if let Err(e) = directory.upsert(member.id, patch).await {
            warn!(error = %e, "Failed to record join");
        }

        let outcome = ResourceProvisioner::new(self.ctx).provision(member).await;

        // Tell every recruiter where to find the new member
        match (&outcome.role, &outcome.channel) {
            (Some(role), Some(channel)) => {
                let fanout = NotificationFanout::new(self.ctx);
                match fanout.role_holders(role).await {
                    Ok(recipients) => {
                        let url = self.ctx.platform().channel_url(channel.guild_id, channel.id);
                        fanout
                            .notify(&recipients, &messages::join_notification(&url))
                            .await;
                    }
                    Err(e) => warn!(error = %e, "Failed to resolve recruiters"),
                }
            }
            _ => warn!("No onboarding channel, recruiters not notified"),
        }

        let stored = match MemberPatch::new().provisioning(&outcome.report) {
            Ok(patch) => directory.upsert(member.id, patch).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = stored {
            warn!(error = %e, "Failed to store provisioning report");
        }

        info!(complete = outcome.report.is_complete(), "Member joined");
        outcome.report
    }

    /// Say goodbye and record the leave
    #[instrument(skip(self, member), fields(member_id = %member.id))]
    pub async fn on_leave(&self, member: &MemberRef) {
        let farewell = messages::farewell(&member.mention(), &self.ctx.onboarding().rejoin_url);
        if let Err(e) = self.ctx.platform().send_direct_message(member.id, &farewell).await {
            debug!(error = %e, "Farewell not delivered");
        }

        let patch = MemberPatch::new()
            .touch(member.display_name.clone())
            .record_leave(Utc::now());
        if let Err(e) = MemberDirectory::new(self.ctx).upsert(member.id, patch).await {
            warn!(error = %e, "Failed to record leave");
        }

        info!("Member left");
    }

    /// Count a message towards its author
    #[instrument(skip(self, author), fields(member_id = %author.id))]
    pub async fn on_message_created(&self, author: &MemberRef) {
        if author.bot {
            return;
        }
        self.adjust_message_count(author, 1).await;
    }

    /// Take a deleted message off its author's count
    #[instrument(skip(self, author))]
    pub async fn on_message_deleted(&self, message_id: Snowflake, author: Option<&MemberRef>) {
        match author {
            Some(author) if author.bot => {}
            Some(author) => self.adjust_message_count(author, -1).await,
            None => debug!(message_id = %message_id, "Author of deleted message unknown, not counted"),
        }
    }

    async fn adjust_message_count(&self, author: &MemberRef, delta: i64) {
        let patch = MemberPatch::new()
            .touch(author.display_name.clone())
            .inserted_at(Utc::now())
            .adjust_message_count(delta);
        if let Err(e) = MemberDirectory::new(self.ctx).upsert(author.id, patch).await {
            warn!(error = %e, member_id = %author.id, "Failed to update message count");
        }
    }
}
