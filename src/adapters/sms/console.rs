//! Dry-run SMS adapter. Logs instead of calling a provider.
//!
//! Records every accepted message so callers (and tests) can inspect what
//! would have been sent. Individual numbers can be configured to fail.

use crate::domain::DomainError;
use crate::ports::SmsService;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// Console SMS adapter.
pub struct ConsoleSms {
    /// Simulated provider latency in milliseconds.
    delay_ms: u64,
    failing: HashSet<String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl ConsoleSms {
    /// No latency, nothing fails.
    pub fn new() -> Self {
        Self {
            delay_ms: 0,
            failing: HashSet::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Sleep `delay_ms` before each send.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Reject every message to `phone`.
    pub fn failing_for(mut self, phone: &str) -> Self {
        self.failing.insert(phone.to_string());
        self
    }

    /// `(to, message)` pairs accepted so far, in send order.
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

impl Default for ConsoleSms {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SmsService for ConsoleSms {
    async fn send_sms(&self, to: &str, message: &str) -> Result<(), DomainError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.failing.contains(to) {
            return Err(DomainError::Sms(format!("[DRY RUN] {} rejected", to)));
        }
        info!(to, chars = message.chars().count(), "[DRY RUN] SMS: {}", message);
        self.sent
            .lock()
            .await
            .push((to.to_string(), message.to_string()));
        Ok(())
    }
}
