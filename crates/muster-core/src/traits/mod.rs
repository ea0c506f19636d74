//! Ports - interfaces the domain needs from the outside world

mod platform;
mod store;

pub use platform::{
    ChannelKind, ChannelRef, CreateChannel, GuildRef, PlatformClient, PlatformError,
    PlatformResult, RoleRef,
};
pub use store::{DocumentStore, PatchOutcome, RepoResult};
