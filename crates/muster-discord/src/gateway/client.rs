//! Gateway connection loop
//!
//! Connects, identifies (or resumes), keeps the heartbeat going and hands every
//! decoded dispatch to an [`EventHandler`]. Dropped connections are replaced
//! after a delay until the gateway answers with a fatal close code.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use super::error::GatewayError;
use super::heartbeat;
use super::session::Session;
use crate::events::GatewayEvent;
use crate::protocol::{
    CloseCode, GatewayMessage, HelloPayload, IdentifyPayload, Intents, OpCode, PresenceUpdatePayload,
};

/// Default wait before reconnecting
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Receives every dispatch in the order the gateway sent them
///
/// Called on the connection task, so implementations must hand long work off
/// to their own tasks.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: GatewayEvent);
}

/// Gateway connection settings
#[derive(Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub token: String,
    pub intents: Intents,
    pub reconnect_delay: Duration,
}

impl GatewayConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            intents: Intents::onboarding(),
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("intents", &self.intents)
            .finish()
    }
}

/// Sends commands over whichever connection is currently open
#[derive(Clone, Default)]
pub struct GatewayHandle {
    outgoing: Arc<Mutex<Option<UnboundedSender<GatewayMessage>>>>,
}

impl GatewayHandle {
    pub fn update_presence(&self, presence: &PresenceUpdatePayload) -> Result<(), GatewayError> {
        self.send(GatewayMessage::presence_update(presence)?)
    }

    pub fn is_connected(&self) -> bool {
        self.outgoing.lock().is_some()
    }

    fn send(&self, message: GatewayMessage) -> Result<(), GatewayError> {
        let outgoing = self.outgoing.lock();
        let tx = outgoing.as_ref().ok_or(GatewayError::NotConnected)?;
        tx.send(message).map_err(|_| GatewayError::NotConnected)
    }

    fn attach(&self, tx: UnboundedSender<GatewayMessage>) {
        *self.outgoing.lock() = Some(tx);
    }

    fn detach(&self) {
        *self.outgoing.lock() = None;
    }
}

/// Why a connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disconnect {
    Reconnect { resume: bool },
    Fatal(CloseCode),
}

impl Disconnect {
    fn from_close_code(code: Option<u16>) -> Self {
        match code.and_then(CloseCode::from_u16) {
            Some(code) if !code.should_reconnect() => Self::Fatal(code),
            Some(code) => Self::Reconnect {
                resume: code.can_resume(),
            },
            None => Self::Reconnect { resume: true },
        }
    }
}

pub struct GatewayClient {
    config: GatewayConfig,
    handler: Arc<dyn EventHandler>,
    session: Arc<Mutex<Session>>,
    handle: GatewayHandle,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            config,
            handler,
            session: Arc::new(Mutex::new(Session::default())),
            handle: GatewayHandle::default(),
        }
    }

    /// Use a handle created before the client, e.g. one already given to the handler
    #[must_use]
    pub fn with_handle(mut self, handle: GatewayHandle) -> Self {
        self.handle = handle;
        self
    }

    pub fn handle(&self) -> GatewayHandle {
        self.handle.clone()
    }

    /// Stay connected until the gateway refuses the session for good
    pub async fn run(&self) -> Result<(), GatewayError> {
        loop {
            let outcome = self.connect().await;
            self.handle.detach();

            match outcome {
                Ok(Disconnect::Fatal(code)) => {
                    tracing::error!(close_code = code.as_u16(), reason = code.description(), "Gateway refused the session");
                    return Err(GatewayError::Fatal(code));
                }
                Ok(Disconnect::Reconnect { resume }) => {
                    if !resume {
                        self.session.lock().reset();
                    }
                    tracing::info!(resume, "Gateway connection ended, reconnecting");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Gateway connection failed");
                }
            }

            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    async fn connect(&self) -> Result<Disconnect, GatewayError> {
        let (resume, url) = {
            let session = self.session.lock();
            let resume = session.resume_payload(&self.config.token);
            let url = resume
                .as_ref()
                .and_then(|_| session.resume_gateway_url())
                .unwrap_or_else(|| self.config.url.clone());
            (resume, url)
        };

        let (socket, _) = connect_async(url.as_str()).await?;
        let (mut ws_sink, mut ws_stream) = socket.split();

        let hello = wait_for_hello(&mut ws_stream).await?;
        let interval = Duration::from_millis(hello.heartbeat_interval);

        let opening = match resume {
            Some(payload) => {
                tracing::info!(session_id = %payload.session_id, seq = payload.seq, "Resuming gateway session");
                GatewayMessage::resume(&payload)?
            }
            None => {
                tracing::info!(intents = self.config.intents.bits(), "Identifying with the gateway");
                GatewayMessage::identify(&IdentifyPayload::new(&self.config.token, self.config.intents))?
            }
        };
        ws_sink.send(Message::Text(opening.to_json()?)).await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<GatewayMessage>();
        self.handle.attach(tx.clone());

        // Spawn task to send messages to WebSocket
        let mut send_task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Ok(json) = msg.to_json() {
                    if ws_sink.send(Message::Text(json)).await.is_err() {
                        tracing::warn!("Failed to send message to gateway");
                        break;
                    }
                }
            }
            let _ = ws_sink.close().await;
        });

        let acked = Arc::new(AtomicBool::new(true));
        let mut heartbeat_task = tokio::spawn(heartbeat::run(
            interval,
            Arc::clone(&self.session),
            Arc::clone(&acked),
            tx.clone(),
        ));

        let outcome = tokio::select! {
            outcome = self.receive(&mut ws_stream, &acked, &tx) => outcome,
            _ = &mut heartbeat_task => {
                tracing::debug!("Heartbeat task ended");
                Ok(Disconnect::Reconnect { resume: true })
            }
            _ = &mut send_task => {
                tracing::debug!("Send task ended");
                Ok(Disconnect::Reconnect { resume: true })
            }
        };

        heartbeat_task.abort();
        send_task.abort();
        outcome
    }

    async fn receive<S>(
        &self,
        stream: &mut S,
        acked: &AtomicBool,
        outgoing: &UnboundedSender<GatewayMessage>,
    ) -> Result<Disconnect, GatewayError>
    where
        S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    {
        while let Some(frame) = stream.next().await {
            match frame? {
                Message::Text(text) => match GatewayMessage::from_json(&text) {
                    Ok(message) => {
                        if let Some(disconnect) = self.handle_message(message, acked, outgoing) {
                            return Ok(disconnect);
                        }
                    }
                    Err(e) => tracing::debug!(error = %e, "Ignoring undecodable gateway message"),
                },
                Message::Close(frame) => {
                    let code = frame.map(|f| u16::from(f.code));
                    tracing::info!(close_code = ?code, "Gateway closed the connection");
                    return Ok(Disconnect::from_close_code(code));
                }
                _ => {}
            }
        }
        Ok(Disconnect::Reconnect { resume: true })
    }

    fn handle_message(
        &self,
        message: GatewayMessage,
        acked: &AtomicBool,
        outgoing: &UnboundedSender<GatewayMessage>,
    ) -> Option<Disconnect> {
        match message.op {
            OpCode::Dispatch => {
                if let Some(sequence) = message.s {
                    self.session.lock().record_sequence(sequence);
                }
                if let Some(event_type) = message.t {
                    self.dispatch(&event_type, message.d.unwrap_or(Value::Null));
                }
                None
            }
            OpCode::Heartbeat => {
                let sequence = self.session.lock().sequence;
                let _ = outgoing.send(GatewayMessage::heartbeat(sequence));
                None
            }
            OpCode::HeartbeatAck => {
                acked.store(true, Ordering::Release);
                None
            }
            OpCode::Reconnect => Some(Disconnect::Reconnect { resume: true }),
            OpCode::InvalidSession => Some(Disconnect::Reconnect {
                resume: message.as_invalid_session().unwrap_or(false),
            }),
            OpCode::Hello | OpCode::Identify | OpCode::PresenceUpdate | OpCode::Resume => None,
        }
    }

    fn dispatch(&self, event_type: &str, data: Value) {
        match GatewayEvent::parse(event_type, data) {
            Ok(event) => {
                if let GatewayEvent::Ready(ready) = &event {
                    self.session
                        .lock()
                        .record_ready(ready.session_id.clone(), ready.resume_gateway_url.clone());
                    tracing::info!(user = %ready.user.tag(), guilds = ready.guilds.len(), "Gateway session ready");
                }
                self.handler.on_event(event);
            }
            Err(e) => tracing::warn!(event = event_type, error = %e, "Failed to decode dispatch"),
        }
    }
}

async fn wait_for_hello<S>(stream: &mut S) -> Result<HelloPayload, GatewayError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        if let Message::Text(text) = frame? {
            let message = GatewayMessage::from_json(&text)?;
            return message
                .as_hello()
                .ok_or_else(|| GatewayError::UnexpectedOpening(message.op.to_string()));
        }
    }
    Err(GatewayError::ClosedBeforeHello)
}
