//! Event translation
//!
//! Turns decoded gateway events into the domain's lifecycle events and command
//! invocations. Message authors are remembered so a later MESSAGE_DELETE, which
//! carries no author, can still be attributed.

use std::collections::{HashMap, VecDeque};

use dashmap::DashMap;
use muster_core::{LifecycleEvent, MemberRef, Snowflake};
use muster_service::{CommandInvocation, OptionValue};
use parking_lot::Mutex;
use serde_json::Value;

use super::payloads::{interaction_type, CommandDataOption, GatewayEvent, InteractionCreateEvent};

const SUB_COMMAND: u8 = 1;
const SUB_COMMAND_GROUP: u8 = 2;

/// Bounded message id → author map, oldest entries evicted first
pub struct MessageAuthorCache {
    capacity: usize,
    inner: Mutex<AuthorCacheInner>,
}

#[derive(Default)]
struct AuthorCacheInner {
    authors: HashMap<Snowflake, MemberRef>,
    order: VecDeque<Snowflake>,
}

impl MessageAuthorCache {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(AuthorCacheInner::default()),
        }
    }

    pub fn remember(&self, message_id: Snowflake, author: MemberRef) {
        let mut inner = self.inner.lock();
        if inner.authors.insert(message_id, author).is_none() {
            inner.order.push_back(message_id);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.authors.remove(&oldest);
            }
        }
    }

    /// Remove and return the author of a message
    pub fn take(&self, message_id: Snowflake) -> Option<MemberRef> {
        let mut inner = self.inner.lock();
        let author = inner.authors.remove(&message_id)?;
        inner.order.retain(|id| *id != message_id);
        Some(author)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MessageAuthorCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Translates gateway events for the rest of the bot
#[derive(Default)]
pub struct EventTranslator {
    authors: MessageAuthorCache,
    guild_names: DashMap<Snowflake, String>,
}

impl EventTranslator {
    #[must_use]
    pub fn new(author_capacity: usize) -> Self {
        Self {
            authors: MessageAuthorCache::new(author_capacity),
            guild_names: DashMap::new(),
        }
    }

    /// Name of a guild seen in GUILD_CREATE
    pub fn guild_name(&self, guild_id: Snowflake) -> Option<String> {
        self.guild_names.get(&guild_id).map(|name| name.clone())
    }

    /// Lifecycle event for a gateway event, if it is one
    pub fn lifecycle(&self, event: &GatewayEvent) -> Option<LifecycleEvent> {
        match event {
            GatewayEvent::GuildCreate(guild) => {
                self.guild_names.insert(guild.id, guild.name.clone());
                None
            }
            GatewayEvent::MemberAdd(add) => Some(LifecycleEvent::MemberJoined {
                guild_id: add.guild_id,
                member: add.member(),
            }),
            GatewayEvent::MemberRemove(remove) => Some(LifecycleEvent::MemberLeft {
                guild_id: remove.guild_id,
                member: remove.user.to_member_ref(None),
            }),
            GatewayEvent::MessageCreate(message) => {
                let author = message.author();
                self.authors.remember(message.id, author.clone());
                Some(LifecycleEvent::MessageCreated {
                    guild_id: message.guild_id,
                    message_id: message.id,
                    author,
                })
            }
            GatewayEvent::MessageDelete(message) => Some(LifecycleEvent::MessageDeleted {
                guild_id: message.guild_id,
                message_id: message.id,
                author: self.authors.take(message.id),
            }),
            GatewayEvent::Ready(_)
            | GatewayEvent::Resumed
            | GatewayEvent::InteractionCreate(_)
            | GatewayEvent::Unknown(_) => None,
        }
    }

    /// Command invocation for an application command interaction
    pub fn invocation(&self, interaction: &InteractionCreateEvent) -> Option<CommandInvocation> {
        if interaction.kind != interaction_type::APPLICATION_COMMAND {
            return None;
        }
        let data = interaction.data.as_ref()?;
        let user = interaction.invoker()?;

        let mut invocation = CommandInvocation::new(data.name.clone(), user);
        if let Some(guild_id) = interaction.guild_id {
            invocation = invocation.in_guild(guild_id, self.guild_name(guild_id));
        }
        Some(flatten_options(invocation, &data.options))
    }
}

/// Lift subcommand group and subcommand names out of the option tree
fn flatten_options(mut invocation: CommandInvocation, options: &[CommandDataOption]) -> CommandInvocation {
    for option in options {
        match option.kind {
            SUB_COMMAND_GROUP => {
                invocation = flatten_options(invocation.group(option.name.clone()), &option.options);
            }
            SUB_COMMAND => {
                invocation = flatten_options(invocation.subcommand(option.name.clone()), &option.options);
            }
            _ => {
                if let Some(value) = option.value.as_ref().and_then(option_value) {
                    invocation = invocation.option(option.name.clone(), value);
                }
            }
        }
    }
    invocation
}

fn option_value(value: &Value) -> Option<OptionValue> {
    match value {
        Value::String(s) => Some(OptionValue::String(s.clone())),
        Value::Bool(b) => Some(OptionValue::Boolean(*b)),
        Value::Number(n) => n.as_i64().map(OptionValue::Integer),
        _ => None,
    }
}
