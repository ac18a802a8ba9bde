//! Outcome record of one bulk-send invocation.
//!
//! Serialized with the field names the HTTP layer already exposes
//! (`numRecipients`, `numFailed`, `recipients`, `errors`).

use serde::{Deserialize, Serialize};

/// A recipient the message was delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentRecipient {
    /// User `_id`.
    pub user: String,
    pub name: String,
}

/// A single entry of the report's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeliveryFailure {
    /// The whole group could not be resolved; none of its users were attempted.
    Group {
        #[serde(rename = "recipientGroup")]
        group: String,
        message: String,
    },
    /// Rendering or delivery failed for one recipient.
    Recipient {
        user: String,
        name: String,
        message: String,
    },
}

impl DeliveryFailure {
    pub fn message(&self) -> &str {
        match self {
            DeliveryFailure::Group { message, .. } | DeliveryFailure::Recipient { message, .. } => {
                message
            }
        }
    }
}

/// Aggregate report for one `send` call.
///
/// Every attempted recipient or failed group lands in exactly one of
/// `recipients` / `errors`, and the counters always match the list lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMessageReport {
    num_recipients: usize,
    num_failed: usize,
    recipients: Vec<SentRecipient>,
    errors: Vec<DeliveryFailure>,
}

impl BulkMessageReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_sent(&mut self, user: impl Into<String>, name: impl Into<String>) {
        self.recipients.push(SentRecipient {
            user: user.into(),
            name: name.into(),
        });
        self.num_recipients += 1;
    }

    pub(crate) fn record_group_failure(
        &mut self,
        group: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(DeliveryFailure::Group {
            group: group.into(),
            message: message.into(),
        });
        self.num_failed += 1;
    }

    pub(crate) fn record_recipient_failure(
        &mut self,
        user: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(DeliveryFailure::Recipient {
            user: user.into(),
            name: name.into(),
            message: message.into(),
        });
        self.num_failed += 1;
    }

    /// Number of recipients the message was delivered to.
    pub fn num_recipients(&self) -> usize {
        self.num_recipients
    }

    /// Number of failed groups plus failed recipients.
    pub fn num_failed(&self) -> usize {
        self.num_failed
    }

    /// Successful deliveries in completion order.
    pub fn recipients(&self) -> &[SentRecipient] {
        &self.recipients
    }

    /// Failures in completion order.
    pub fn errors(&self) -> &[DeliveryFailure] {
        &self.errors
    }

    pub fn is_complete_success(&self) -> bool {
        self.num_failed == 0
    }

    /// Groups whose resolution failed.
    pub fn failed_groups(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                DeliveryFailure::Group { group, .. } => Some(group.as_str()),
                DeliveryFailure::Recipient { .. } => None,
            })
            .collect()
    }

    /// `_id`s of recipients whose render or delivery failed.
    pub fn failed_user_ids(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                DeliveryFailure::Recipient { user, .. } => Some(user.as_str()),
                DeliveryFailure::Group { .. } => None,
            })
            .collect()
    }

    /// Group names that target exactly the failed subset of this report.
    /// Failed groups are repeated as-is; failed recipients become `user:<id>`.
    pub fn retry_groups(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| match e {
                DeliveryFailure::Group { group, .. } => group.clone(),
                DeliveryFailure::Recipient { user, .. } => format!("user:{}", user),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_follow_lists() {
        let mut report = BulkMessageReport::new();
        report.record_sent("1", "Alice");
        report.record_recipient_failure("2", "Bob", "provider down");
        report.record_group_failure("team:ops", "lookup failed");

        assert_eq!(report.num_recipients(), 1);
        assert_eq!(report.num_failed(), 2);
        assert_eq!(report.recipients().len(), 1);
        assert_eq!(report.errors().len(), 2);
        assert!(!report.is_complete_success());
    }

    #[test]
    fn test_retry_groups() {
        let mut report = BulkMessageReport::new();
        report.record_sent("1", "Alice");
        report.record_recipient_failure("2", "Bob", "provider down");
        report.record_group_failure("team:ops", "lookup failed");

        assert_eq!(report.failed_user_ids(), vec!["2"]);
        assert_eq!(report.failed_groups(), vec!["team:ops"]);
        assert_eq!(
            report.retry_groups(),
            vec!["user:2".to_string(), "team:ops".to_string()]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let mut report = BulkMessageReport::new();
        report.record_sent("1", "Alice");
        report.record_recipient_failure("2", "Bob", "boom");
        report.record_group_failure("team:x", "gone");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["numRecipients"], 1);
        assert_eq!(json["numFailed"], 2);
        assert_eq!(json["recipients"][0]["user"], "1");
        assert_eq!(json["errors"][0]["user"], "2");
        assert_eq!(json["errors"][0]["message"], "boom");
        assert_eq!(json["errors"][1]["recipientGroup"], "team:x");
        assert!(json["errors"][1].get("user").is_none());

        let back: BulkMessageReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
