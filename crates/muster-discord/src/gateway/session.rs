//! Resumable session state
//!
//! Survives reconnects so a dropped connection can be resumed instead of
//! identifying from scratch.

use crate::protocol::ResumePayload;

/// Query string every gateway URL carries
pub const GATEWAY_QUERY: &str = "?v=10&encoding=json";

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub session_id: Option<String>,
    /// Host to reconnect to when resuming
    pub resume_url: Option<String>,
    /// Last dispatch sequence number received
    pub sequence: Option<u64>,
}

impl Session {
    pub fn record_ready(&mut self, session_id: String, resume_url: Option<String>) {
        self.session_id = Some(session_id);
        self.resume_url = resume_url;
    }

    pub fn record_sequence(&mut self, sequence: u64) {
        self.sequence = Some(self.sequence.map_or(sequence, |current| current.max(sequence)));
    }

    /// Forget the session; the next connection identifies again
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resume payload, if there is a session to resume
    pub fn resume_payload(&self, token: &str) -> Option<ResumePayload> {
        Some(ResumePayload {
            token: token.to_string(),
            session_id: self.session_id.clone()?,
            seq: self.sequence?,
        })
    }

    /// URL to connect to when resuming
    pub fn resume_gateway_url(&self) -> Option<String> {
        self.resume_url
            .as_deref()
            .map(|base| format!("{}/{GATEWAY_QUERY}", base.trim_end_matches('/')))
    }
}
