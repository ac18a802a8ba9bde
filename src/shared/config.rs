//! Application configuration. Provider credentials, paths, send tuning.

use crate::adapters::sms::africastalking::{AFRICASTALKING_SANDBOX_URL, AFRICASTALKING_SMS_URL};
use crate::usecases::DEFAULT_SEND_CONCURRENCY;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Base directory for users file and saved reports. Read from WELFARE_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Users export (JSON array or CSV). Read from WELFARE_USERS_FILE.
    #[serde(default)]
    pub users_file: Option<String>,

    /// Organization name, available to templates as {{organization}}. Read from WELFARE_ORGANIZATION.
    #[serde(default)]
    pub organization: Option<String>,

    /// Max simultaneous SMS sends per bulk message. Read from WELFARE_SEND_CONCURRENCY.
    #[serde(default)]
    pub send_concurrency: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // Africa's Talking
    // ─────────────────────────────────────────────────────────────────────────
    /// Application username. Read from WELFARE_AT_USERNAME or AT_USERNAME.
    #[serde(default)]
    pub at_username: Option<String>,

    /// API key. Read from WELFARE_AT_API_KEY or AT_API_KEY.
    #[serde(default)]
    pub at_api_key: Option<String>,

    /// Registered sender ID / short code (optional). Read from WELFARE_AT_SENDER_ID.
    #[serde(default)]
    pub at_sender_id: Option<String>,

    /// Messaging endpoint. Defaults to production, or the sandbox for the
    /// `sandbox` username. Read from WELFARE_AT_API_URL.
    #[serde(default)]
    pub at_api_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("WELFARE").try_parsing(true));
        if let Ok(path) = std::env::var("WELFARE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let cfg: Self = c.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Returns the data directory. Defaults to `./data`.
    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    /// Returns the users file. Defaults to `<data_dir>/users.json`.
    pub fn users_file_or_default(&self) -> PathBuf {
        self.users_file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir_or_default().join("users.json"))
    }

    /// Returns the reports directory: `<data_dir>/reports`.
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir_or_default().join("reports")
    }

    /// Returns the organization name. Defaults to "Welfare".
    pub fn organization_or_default(&self) -> String {
        self.organization
            .clone()
            .unwrap_or_else(|| "Welfare".to_string())
    }

    /// Returns send concurrency. Defaults to DEFAULT_SEND_CONCURRENCY if unset.
    pub fn send_concurrency_or_default(&self) -> usize {
        self.send_concurrency.unwrap_or(DEFAULT_SEND_CONCURRENCY)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Africa's Talking Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the Africa's Talking username from config or AT_USERNAME env.
    pub fn at_username(&self) -> Option<String> {
        self.at_username
            .clone()
            .or_else(|| std::env::var("AT_USERNAME").ok())
            .filter(|s| !s.trim().is_empty())
    }

    /// Returns the Africa's Talking API key from config or AT_API_KEY env.
    pub fn at_api_key(&self) -> Option<String> {
        self.at_api_key
            .clone()
            .or_else(|| std::env::var("AT_API_KEY").ok())
            .filter(|s| !s.trim().is_empty())
    }

    /// Returns the messaging endpoint. Africa's Talking reserves the `sandbox`
    /// username for its test environment, so that user defaults to the sandbox URL.
    pub fn at_api_url_or_default(&self) -> String {
        if let Some(url) = self.at_api_url.clone().filter(|s| !s.trim().is_empty()) {
            return url;
        }
        match self.at_username().as_deref() {
            Some("sandbox") => AFRICASTALKING_SANDBOX_URL.to_string(),
            _ => AFRICASTALKING_SMS_URL.to_string(),
        }
    }

    /// Returns true if Africa's Talking is fully configured (username and API key).
    pub fn is_sms_configured(&self) -> bool {
        self.at_username().is_some() && self.at_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir_or_default(), PathBuf::from("./data"));
        assert_eq!(
            cfg.users_file_or_default(),
            PathBuf::from("./data").join("users.json")
        );
        assert_eq!(cfg.reports_dir(), PathBuf::from("./data").join("reports"));
        assert_eq!(cfg.organization_or_default(), "Welfare");
        assert_eq!(cfg.send_concurrency_or_default(), DEFAULT_SEND_CONCURRENCY);
        assert_eq!(cfg.at_api_url_or_default(), AFRICASTALKING_SMS_URL);
    }

    #[test]
    fn test_explicit_values() {
        let cfg = AppConfig {
            data_dir: Some("/srv/welfare".into()),
            users_file: Some("/srv/members.csv".into()),
            at_username: Some("umoja".into()),
            at_api_key: Some("key".into()),
            ..Default::default()
        };
        assert_eq!(cfg.users_file_or_default(), PathBuf::from("/srv/members.csv"));
        assert_eq!(cfg.reports_dir(), PathBuf::from("/srv/welfare/reports"));
        assert!(cfg.is_sms_configured());
        assert_eq!(cfg.at_api_url_or_default(), AFRICASTALKING_SMS_URL);
    }

    #[test]
    fn test_sandbox_username_uses_sandbox_url() {
        let cfg = AppConfig {
            at_username: Some("sandbox".into()),
            ..Default::default()
        };
        assert_eq!(cfg.at_api_url_or_default(), AFRICASTALKING_SANDBOX_URL);

        let cfg = AppConfig {
            at_username: Some("sandbox".into()),
            at_api_url: Some("http://localhost:9000/messaging".into()),
            ..Default::default()
        };
        assert_eq!(cfg.at_api_url_or_default(), "http://localhost:9000/messaging");
    }
}
