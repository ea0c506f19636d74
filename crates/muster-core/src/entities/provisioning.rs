//! Provisioning state record - outcome of each onboarding step for one join

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Outcome of a single provisioning step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not attempted yet
    #[default]
    Pending,
    Done,
    Failed,
    /// Not attempted because an earlier step produced nothing to build on
    Skipped,
}

impl StepStatus {
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Per-step outcome of one provisioning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningReport {
    pub role: StepStatus,
    pub container: StepStatus,
    pub channel: StepStatus,
    pub greeting: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Snowflake>,
    pub updated_at: DateTime<Utc>,
}

impl ProvisioningReport {
    /// Fresh report with every step pending
    pub fn pending(now: DateTime<Utc>) -> Self {
        Self {
            role: StepStatus::Pending,
            container: StepStatus::Pending,
            channel: StepStatus::Pending,
            greeting: StepStatus::Pending,
            channel_id: None,
            updated_at: now,
        }
    }

    /// Every step completed
    pub fn is_complete(&self) -> bool {
        self.role.is_done() && self.container.is_done() && self.channel.is_done() && self.greeting.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_is_incomplete() {
        let report = ProvisioningReport::pending(Utc::now());
        assert!(!report.is_complete());
        assert_eq!(report.channel, StepStatus::Pending);
    }

    #[test]
    fn test_serialized_shape() {
        let mut report = ProvisioningReport::pending("2024-01-01T00:00:00Z".parse().unwrap());
        report.role = StepStatus::Done;
        report.container = StepStatus::Done;
        report.channel = StepStatus::Failed;
        report.greeting = StepStatus::Skipped;

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "role": "done",
                "container": "done",
                "channel": "failed",
                "greeting": "skipped",
                "updatedAt": "2024-01-01T00:00:00Z"
            })
        );
    }
}
