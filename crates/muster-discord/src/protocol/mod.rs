//! Gateway protocol definitions
//!
//! Op codes, the message envelope, close codes and the non-dispatch payloads.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{
    Activity, ActivityKind, HelloPayload, IdentifyPayload, IdentifyProperties, Intents,
    PresenceUpdatePayload, ResumePayload,
};
