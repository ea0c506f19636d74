//! Gateway client
//!
//! Keeps one WebSocket session to the Discord gateway alive.

mod client;
mod error;
mod heartbeat;
mod session;

pub use client::{EventHandler, GatewayClient, GatewayConfig, GatewayHandle};
pub use error::GatewayError;
pub use heartbeat::first_beat_delay;
pub use session::{Session, GATEWAY_QUERY};
