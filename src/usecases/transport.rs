//! Default message transport: one SMS per recipient.

use crate::domain::{DomainError, User};
use crate::ports::{MessageTransport, SmsService};
use std::sync::Arc;

/// Wraps an [`SmsService`]; used when no explicit transport is injected.
pub struct SmsMessageTransport {
    sms: Arc<dyn SmsService>,
}

impl SmsMessageTransport {
    pub fn new(sms: Arc<dyn SmsService>) -> Self {
        Self { sms }
    }
}

#[async_trait::async_trait]
impl MessageTransport for SmsMessageTransport {
    async fn send_message(&self, recipient: &User, message: &str) -> Result<(), DomainError> {
        let phone = recipient.phone.trim();
        if phone.is_empty() {
            return Err(DomainError::Transport(format!(
                "user {} has no phone number",
                recipient.id
            )));
        }
        self.sms
            .send_sms(phone, message)
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sms::ConsoleSms;

    fn user(phone: &str) -> User {
        User {
            id: "7".into(),
            name: "Grace".into(),
            phone: phone.into(),
            email: None,
            team: None,
            join_date: None,
        }
    }

    #[tokio::test]
    async fn test_sends_through_sms_service() {
        let sms = Arc::new(ConsoleSms::new());
        let transport = SmsMessageTransport::new(sms.clone());
        transport
            .send_message(&user(" +254722000000 "), "hello")
            .await
            .unwrap();

        let sent = sms.sent().await;
        assert_eq!(sent, vec![("+254722000000".to_string(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn test_rejects_missing_phone() {
        let sms = Arc::new(ConsoleSms::new());
        let transport = SmsMessageTransport::new(sms.clone());
        let err = transport.send_message(&user("  "), "hello").await;
        assert!(matches!(err, Err(DomainError::Transport(_))));
        assert!(sms.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_provider_errors_become_transport_errors() {
        let sms = Arc::new(ConsoleSms::new().failing_for("+254700000001"));
        let transport = SmsMessageTransport::new(sms);
        let err = transport.send_message(&user("+254700000001"), "x").await;
        assert!(matches!(err, Err(DomainError::Transport(_))));
    }
}
