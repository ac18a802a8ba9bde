//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Required collaborators are missing. Raised while wiring, never at send time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more recipient groups cannot be resolved. Nothing was sent.
    #[error("Invalid recipient groups: {}", .invalid_groups.join(", "))]
    Validation { invalid_groups: Vec<String> },

    #[error("Failed to resolve recipient group '{group}': {reason}")]
    Resolution { group: String, reason: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Message context error: {0}")]
    Context(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// A collaborator panicked while handling one recipient.
    #[error("Delivery panicked: {0}")]
    Panicked(String),

    #[error("User lookup failed: {0}")]
    UserLookup(String),

    #[error("SMS provider error: {0}")]
    Sms(String),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Batch queue closed: {0}")]
    QueueClosed(String),

    #[error("Prompt failed: {0}")]
    Ui(String),
}
