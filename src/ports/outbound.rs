//! Outbound ports. Application calls into infrastructure and pluggable strategies.
//!
//! Implemented by adapters (providers, user storage) and by the default
//! strategies in `usecases`.

use crate::domain::{DomainError, MessageContext, User};

/// User lookup owned by the persistence layer. Read-only from this crate.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Every registered user.
    async fn all_users(&self) -> Result<Vec<User>, DomainError>;

    /// Users whose team matches `team` (case-insensitive).
    async fn users_in_team(&self, team: &str) -> Result<Vec<User>, DomainError>;

    /// Single user by `_id`. `Ok(None)` when no such user exists.
    async fn find_user(&self, id: &str) -> Result<Option<User>, DomainError>;
}

/// Raw SMS provider (Africa's Talking, console dry-run, ...).
#[async_trait::async_trait]
pub trait SmsService: Send + Sync {
    async fn send_sms(&self, to: &str, message: &str) -> Result<(), DomainError>;
}

/// Builds the per-recipient template context. Supplied by the caller.
#[async_trait::async_trait]
pub trait MessageContextFactory: Send + Sync {
    async fn create_context_from_user(&self, user: &User) -> Result<MessageContext, DomainError>;
}

/// Maps recipient group names to users.
#[async_trait::async_trait]
pub trait RecipientResolver: Send + Sync {
    /// Pure check used for up-front validation. No I/O.
    fn can_resolve(&self, group: &str) -> bool;

    /// Users in `group`. An empty but valid group is `Ok(vec![])`;
    /// unknown groups and lookup failures are `DomainError::Resolution`.
    async fn resolve(&self, group: &str) -> Result<Vec<User>, DomainError>;
}

/// Expands a template for one recipient. Must be deterministic.
#[async_trait::async_trait]
pub trait MessageTemplateResolver: Send + Sync {
    async fn resolve(&self, context: &MessageContext, template: &str)
    -> Result<String, DomainError>;
}

/// Delivers one rendered message to one recipient.
#[async_trait::async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_message(&self, recipient: &User, message: &str) -> Result<(), DomainError>;
}
