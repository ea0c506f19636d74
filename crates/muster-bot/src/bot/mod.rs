//! Gateway event routing
//!
//! [`Bot`] receives every dispatch in order, translates it on the connection
//! task (so the message author cache sees creates before deletes) and runs the
//! resulting work on its own spawned task.

pub mod ready;

use std::sync::Arc;

use muster_discord::events::{interaction_type, GatewayEvent, InteractionCreateEvent, ReadyEvent};
use muster_discord::protocol::{ActivityKind, PresenceUpdatePayload};
use muster_discord::{DiscordRest, EventHandler, EventTranslator, GatewayHandle};
use muster_service::commands::generic_failure;
use muster_service::{CommandRegistry, LifecycleOrchestrator, ServiceContext};
use tracing::{debug, info, warn};

/// Activity shown under the bot's name
pub const PRESENCE_ACTIVITY: &str = "enemy comms...";

pub struct Bot {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: ServiceContext,
    registry: CommandRegistry,
    translator: EventTranslator,
    rest: Arc<DiscordRest>,
    gateway: GatewayHandle,
}

impl Bot {
    pub fn new(ctx: ServiceContext, rest: Arc<DiscordRest>, gateway: GatewayHandle) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                registry: CommandRegistry::standard(),
                translator: EventTranslator::default(),
                rest,
                gateway,
            }),
        }
    }
}

impl EventHandler for Bot {
    fn on_event(&self, event: GatewayEvent) {
        match event {
            GatewayEvent::Ready(ready) => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move { inner.on_ready(&ready).await });
            }
            GatewayEvent::InteractionCreate(interaction) => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move { inner.on_interaction(&interaction).await });
            }
            other => match self.inner.translator.lifecycle(&other) {
                Some(lifecycle) => {
                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move {
                        LifecycleOrchestrator::new(&inner.ctx).handle(lifecycle).await;
                    });
                }
                None => debug!(event = other.name(), "Ignoring dispatch"),
            },
        }
    }
}

impl Inner {
    async fn on_ready(&self, ready: &ReadyEvent) {
        let tag = ready.user.tag();
        info!(user = %tag, application_id = %ready.application.id, "Bot is ready");

        let presence = PresenceUpdatePayload::online(ActivityKind::Listening, PRESENCE_ACTIVITY);
        if let Err(e) = self.gateway.update_presence(&presence) {
            warn!(error = %e, "Failed to set presence");
        }

        ready::run(&self.ctx, &self.registry, ready.application.id, &tag).await;
    }

    async fn on_interaction(&self, interaction: &InteractionCreateEvent) {
        if interaction.kind != interaction_type::APPLICATION_COMMAND {
            debug!(interaction_id = %interaction.id, kind = interaction.kind, "Ignoring non-command interaction");
            return;
        }

        let reply = match self.translator.invocation(interaction) {
            Some(invocation) => self.registry.dispatch(&self.ctx, &invocation).await,
            None => {
                warn!(interaction_id = %interaction.id, "Command interaction without data or user");
                generic_failure()
            }
        };

        if let Err(e) = self
            .rest
            .create_interaction_response(interaction.id, &interaction.token, &reply)
            .await
        {
            warn!(interaction_id = %interaction.id, error = %e, "Failed to answer interaction");
        }
    }
}
