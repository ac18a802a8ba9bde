//! Standard message context factory: user fields plus the organization name.

use crate::domain::{DomainError, MessageContext, User};
use crate::ports::MessageContextFactory;

pub struct StandardContextFactory {
    organization: String,
}

impl StandardContextFactory {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }
}

#[async_trait::async_trait]
impl MessageContextFactory for StandardContextFactory {
    async fn create_context_from_user(&self, user: &User) -> Result<MessageContext, DomainError> {
        let name = user.name.trim();
        if name.is_empty() {
            return Err(DomainError::Context(format!("user {} has no name", user.id)));
        }
        let first_name = name.split_whitespace().next().unwrap_or(name).to_string();

        Ok(MessageContext {
            name: name.to_string(),
            first_name,
            phone: user.phone.trim().to_string(),
            email: user.email.clone(),
            team: user.team.clone(),
            join_date: user.join_date,
            organization: self.organization.clone(),
        })
    }
}
