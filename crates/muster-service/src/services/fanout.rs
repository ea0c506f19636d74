//! Notification fan-out
//!
//! Delivers one direct message to a set of recipients resolved at call time.
//! Deliveries run concurrently; a failed delivery is logged and never affects
//! the others.

use futures::future::join_all;
use muster_core::traits::{PlatformError, RoleRef};
use muster_core::Snowflake;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Notification fan-out service
pub struct NotificationFanout<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationFanout<'a> {
    /// Create a new NotificationFanout
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Current holders of `role`
    #[instrument(skip(self, role), fields(role_id = %role.id))]
    pub async fn role_holders(&self, role: &RoleRef) -> ServiceResult<Vec<Snowflake>> {
        let holders = self
            .ctx
            .platform()
            .members_with_role(self.ctx.guild_id(), role.id)
            .await?;
        debug!(count = holders.len(), "Resolved role holders");
        Ok(holders)
    }

    /// Send `message` to every recipient
    #[instrument(skip(self, recipients, message), fields(recipients = recipients.len()))]
    pub async fn notify(&self, recipients: &[Snowflake], message: &str) {
        let deliveries = recipients.iter().map(|&recipient| async move {
            let result = self.ctx.platform().send_direct_message(recipient, message).await;
            match &result {
                Ok(()) => {}
                Err(PlatformError::RecipientUnreachable(_)) => {
                    warn!(recipient = %recipient, "Recipient does not accept direct messages");
                }
                Err(e) => {
                    warn!(recipient = %recipient, error = %e, "Failed to deliver notification");
                }
            }
            result.is_ok()
        });

        let delivered = join_all(deliveries).await.into_iter().filter(|ok| *ok).count();
        info!(delivered, failed = recipients.len() - delivered, "Notification fan-out finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_context, PlatformCall};

    #[tokio::test]
    async fn test_one_failure_does_not_stop_others() {
        let (ctx, _, platform) = test_context();
        let recipients: Vec<Snowflake> = (1..=4).map(Snowflake::new).collect();
        platform.set_unreachable(Snowflake::new(2));

        NotificationFanout::new(&ctx).notify(&recipients, "hello").await;

        let delivered: Vec<Snowflake> = platform.direct_messages().into_iter().map(|(id, _)| id).collect();
        assert_eq!(delivered.len(), 3);
        assert!(!delivered.contains(&Snowflake::new(2)));
        assert_eq!(platform.calls(PlatformCall::DirectMessage), 4);
    }

    #[tokio::test]
    async fn test_empty_recipient_set() {
        let (ctx, _, platform) = test_context();
        NotificationFanout::new(&ctx).notify(&[], "hello").await;
        assert_eq!(platform.calls(PlatformCall::DirectMessage), 0);
    }

    #[tokio::test]
    async fn test_role_holders() {
        let (ctx, _, platform) = test_context();
        let role = platform.with_role("ncg/recruitment");
        platform.assign_role(role.id, Snowflake::new(7));
        platform.assign_role(role.id, Snowflake::new(8));

        let holders = NotificationFanout::new(&ctx).role_holders(&role).await.unwrap();
        assert_eq!(holders, vec![Snowflake::new(7), Snowflake::new(8)]);
    }
}
