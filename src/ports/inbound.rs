//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI drives the bulk messaging use case.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive compose -> preview -> send flow until the user quits.
    async fn run(&self) -> Result<(), DomainError>;
}
