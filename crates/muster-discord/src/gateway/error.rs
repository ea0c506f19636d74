//! Gateway client errors

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::protocol::CloseCode;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("invalid gateway payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("expected Hello, received op {0}")]
    UnexpectedOpening(String),

    #[error("connection closed before Hello")]
    ClosedBeforeHello,

    /// The gateway refused the session for good
    #[error("gateway closed the connection: {0}")]
    Fatal(CloseCode),

    #[error("not connected to the gateway")]
    NotConnected,
}
