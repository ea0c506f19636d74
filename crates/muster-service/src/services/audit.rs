//! Audit log
//!
//! Writes operator-facing lines to the `logs` collection. Every line is also
//! emitted through tracing, so a store outage only loses the stored copy.

use muster_core::entities::LogRecord;
use muster_core::LOGS_COLLECTION;
use tracing::{info, warn};
use uuid::Uuid;

use super::context::ServiceContext;

/// Audit log service
pub struct AuditLog<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuditLog<'a> {
    /// Create a new AuditLog
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a line; storage failures are logged and swallowed
    pub async fn record(&self, message: impl Into<String>) {
        let record = LogRecord::new(message);
        info!(target: "muster::audit", "{}", record.message);

        let document = match serde_json::to_value(&record) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Failed to encode audit record");
                return;
            }
        };

        if let Err(e) = self
            .ctx
            .store()
            .insert(LOGS_COLLECTION, &Uuid::new_v4().to_string(), document)
            .await
        {
            warn!(error = %e, "Failed to store audit record");
        }
    }
}
