//! Gateway events
//!
//! Decoding of the dispatch events the bot consumes and their translation into
//! domain events.

mod event_types;
mod payloads;
mod translate;

pub use event_types::GatewayEventType;
pub use payloads::{
    interaction_type, CommandData, CommandDataOption, GatewayEvent, GuildCreateEvent,
    GuildMemberAddEvent, GuildMemberRemoveEvent, InteractionCreateEvent, MemberPayload,
    MessageCreateEvent, MessageDeleteEvent, PartialApplication, ReadyEvent, UnavailableGuild,
    UserPayload,
};
pub use translate::{EventTranslator, MessageAuthorCache};
