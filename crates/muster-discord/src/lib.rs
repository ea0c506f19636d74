//! # muster-discord
//!
//! Discord adapter: a gateway client that decodes dispatch events, a REST
//! client implementing the platform port, and the translation from Discord
//! payloads to lifecycle events and command invocations.

pub mod events;
pub mod gateway;
pub mod protocol;
pub mod rest;

pub use events::{EventTranslator, GatewayEvent};
pub use gateway::{EventHandler, GatewayClient, GatewayConfig, GatewayError, GatewayHandle};
pub use rest::DiscordRest;
