//! Discord REST API
//!
//! [`DiscordRest`] implements the platform port on top of the v10 HTTP API.

mod client;
mod models;

pub use client::{DiscordRest, CANNOT_MESSAGE_USER};
pub use models::{callback_type, channel_type, EPHEMERAL_FLAG};
