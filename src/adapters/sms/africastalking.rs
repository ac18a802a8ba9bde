//! Africa's Talking adapter. Implements SmsService via the bulk SMS REST endpoint.
//!
//! Form-encoded POST with the `apiKey` header; the JSON response carries a
//! per-recipient status that must be `Success`.

use crate::domain::DomainError;
use crate::ports::SmsService;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Production messaging endpoint.
pub const AFRICASTALKING_SMS_URL: &str = "https://api.africastalking.com/version1/messaging";
/// Sandbox messaging endpoint (username must be `sandbox`).
pub const AFRICASTALKING_SANDBOX_URL: &str =
    "https://api.sandbox.africastalking.com/version1/messaging";

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "SMSMessageData")]
    data: SmsMessageData,
}

#[derive(Debug, Deserialize)]
struct SmsMessageData {
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Recipients", default)]
    recipients: Vec<RecipientStatus>,
}

#[derive(Debug, Deserialize)]
struct RecipientStatus {
    number: String,
    status: String,
    #[serde(rename = "messageId", default)]
    message_id: Option<String>,
}

/// Africa's Talking SMS adapter.
///
/// Credentials come from the Africa's Talking dashboard. `sender_id` is the
/// optional registered short code or alphanumeric sender.
pub struct AfricasTalkingSms {
    client: Client,
    api_url: String,
    username: String,
    api_key: String,
    sender_id: Option<String>,
}

impl AfricasTalkingSms {
    /// Create a new adapter.
    ///
    /// # Arguments
    /// * `api_url` - Messaging endpoint (production or sandbox)
    /// * `username` - Africa's Talking application username
    /// * `api_key` - API key for that application
    /// * `sender_id` - Optional sender ID / short code
    pub fn new(
        api_url: String,
        username: String,
        api_key: String,
        sender_id: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url,
            username,
            api_key,
            sender_id,
        }
    }
}

#[async_trait::async_trait]
impl SmsService for AfricasTalkingSms {
    async fn send_sms(&self, to: &str, message: &str) -> Result<(), DomainError> {
        let mut form = vec![
            ("username", self.username.as_str()),
            ("to", to),
            ("message", message),
        ];
        if let Some(from) = self.sender_id.as_deref() {
            form.push(("from", from));
        }

        let res = self
            .client
            .post(&self.api_url)
            .header("apiKey", &self.api_key)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| DomainError::Sms(format!("Request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(DomainError::Sms(format!(
                "Africa's Talking API error {}: {}",
                status, text
            )));
        }

        let body: SendResponse = res
            .json()
            .await
            .map_err(|e| DomainError::Sms(format!("Invalid response: {}", e)))?;

        if body.data.recipients.is_empty() {
            return Err(DomainError::Sms(format!(
                "message not accepted: {}",
                body.data.message
            )));
        }
        if let Some(rejected) = body.data.recipients.iter().find(|r| r.status != "Success") {
            return Err(DomainError::Sms(format!(
                "{} rejected: {}",
                rejected.number, rejected.status
            )));
        }

        debug!(
            to,
            message_id = body.data.recipients[0].message_id.as_deref().unwrap_or(""),
            "SMS accepted by Africa's Talking"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> AfricasTalkingSms {
        AfricasTalkingSms::new(
            format!("{}/version1/messaging", server.uri()),
            "sandbox".into(),
            "test-key".into(),
            Some("WELFARE".into()),
        )
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "SMSMessageData": {
                "Message": "Sent to 1/1 Total Cost: KES 0.8000",
                "Recipients": [{
                    "statusCode": 101,
                    "number": "+254711000111",
                    "status": "Success",
                    "cost": "KES 0.8000",
                    "messageId": "ATPid_1"
                }]
            }
        });
        Mock::given(method("POST"))
            .and(path("/version1/messaging"))
            .and(header("apiKey", "test-key"))
            .and(body_string_contains("username=sandbox"))
            .and(body_string_contains("from=WELFARE"))
            .respond_with(ResponseTemplate::new(201).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        adapter(&server)
            .send_sms("+254711000111", "Hello there")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_recipient() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "SMSMessageData": {
                "Message": "Sent to 0/1 Total Cost: 0",
                "Recipients": [{
                    "statusCode": 403,
                    "number": "+254711000111",
                    "status": "InvalidPhoneNumber",
                    "cost": "0"
                }]
            }
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(&body))
            .mount(&server)
            .await;

        let err = adapter(&server).send_sms("+254711000111", "x").await;
        match err {
            Err(DomainError::Sms(msg)) => assert!(msg.contains("InvalidPhoneNumber")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("The supplied authentication is invalid"))
            .mount(&server)
            .await;

        let err = adapter(&server).send_sms("+254711000111", "x").await;
        assert!(matches!(err, Err(DomainError::Sms(msg)) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_empty_recipients() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "SMSMessageData": { "Message": "InvalidSenderId", "Recipients": [] }
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(&body))
            .mount(&server)
            .await;

        let err = adapter(&server).send_sms("+254711000111", "x").await;
        assert!(matches!(err, Err(DomainError::Sms(msg)) if msg.contains("InvalidSenderId")));
    }
}
