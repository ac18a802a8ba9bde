//! Bulk messaging use case: validate groups -> resolve recipients -> batched send -> report.
//!
//! - Invalid group names fail the whole call before anything is sent
//! - Group and recipient failures are recorded in the report, never returned
//! - Recipients appearing in several groups are messaged once

use crate::domain::{BulkMessageReport, DomainError, User};
use crate::ports::{
    MessageContextFactory, MessageTemplateResolver, MessageTransport, RecipientResolver,
    SmsService, UserService,
};
use crate::usecases::batch_job_queue::{BatchJobQueue, DEFAULT_SEND_CONCURRENCY};
use crate::usecases::recipient_resolver::UserGroupResolver;
use crate::usecases::template::PlaceholderTemplateResolver;
use crate::usecases::transport::SmsMessageTransport;
use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Synthetic recipient used by [`BulkMessageService::preview_message`]. Never persisted.
pub fn preview_user() -> User {
    User {
        id: "preview".into(),
        name: "John Doe".into(),
        phone: "+254700000000".into(),
        email: Some("john.doe@example.com".into()),
        team: Some("Preview Team".into()),
        join_date: NaiveDate::from_ymd_opt(2020, 1, 1),
    }
}

/// Collaborators needed to render and deliver one recipient's message.
struct Delivery {
    context_factory: Arc<dyn MessageContextFactory>,
    template_resolver: Arc<dyn MessageTemplateResolver>,
    transport: Arc<dyn MessageTransport>,
}

impl Delivery {
    async fn render(&self, user: &User, template: &str) -> Result<String, DomainError> {
        let context = self.context_factory.create_context_from_user(user).await?;
        self.template_resolver.resolve(&context, template).await
    }

    async fn deliver(&self, user: &User, template: &str) -> Result<(), DomainError> {
        let message = self.render(user, template).await?;
        self.transport.send_message(user, &message).await
    }

    /// Like `deliver`, but a panicking collaborator becomes `DomainError::Panicked`
    /// so the recipient still lands in the report.
    async fn deliver_isolated(&self, user: &User, template: &str) -> Result<(), DomainError> {
        AssertUnwindSafe(self.deliver(user, template))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(DomainError::Panicked(panic_message(payload.as_ref()))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Bulk message service. Sends one template to every member of the requested groups.
pub struct BulkMessageService {
    recipient_resolver: Arc<dyn RecipientResolver>,
    delivery: Arc<Delivery>,
    concurrency: usize,
}

impl BulkMessageService {
    pub fn builder() -> BulkMessageServiceBuilder {
        BulkMessageServiceBuilder::default()
    }

    /// Maximum simultaneous deliveries per `send`.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Whether `group` would pass validation in [`BulkMessageService::send`].
    pub fn can_resolve(&self, group: &str) -> bool {
        self.recipient_resolver.can_resolve(group)
    }

    /// Send `message_template` to every distinct user of `recipient_groups`.
    ///
    /// Returns `DomainError::Validation` (nothing sent) if any group name is not
    /// resolvable. Otherwise always returns a complete report.
    pub async fn send<S: AsRef<str>>(
        &self,
        recipient_groups: &[S],
        message_template: &str,
    ) -> Result<BulkMessageReport, DomainError> {
        let groups = self.validate_groups(recipient_groups)?;
        let report = Arc::new(Mutex::new(BulkMessageReport::new()));

        let recipients = self.resolve_recipients(&groups, &report).await;
        info!(
            groups = groups.len(),
            recipients = recipients.len(),
            concurrency = self.concurrency,
            "sending bulk message"
        );

        let template: Arc<str> = Arc::from(message_template);
        let queue = {
            let delivery = Arc::clone(&self.delivery);
            let report = Arc::clone(&report);
            BatchJobQueue::new(self.concurrency, move |user: User| {
                let delivery = Arc::clone(&delivery);
                let report = Arc::clone(&report);
                let template = Arc::clone(&template);
                async move {
                    match delivery.deliver_isolated(&user, &template).await {
                        Ok(()) => {
                            debug!(user = %user.id, "message sent");
                            report.lock().await.record_sent(user.id, user.name);
                        }
                        Err(e) => {
                            warn!(user = %user.id, error = %e, "message delivery failed");
                            report
                                .lock()
                                .await
                                .record_recipient_failure(user.id, user.name, e.to_string());
                        }
                    }
                }
            })
        };

        for user in recipients {
            queue.push(user)?;
        }
        queue.signal_eof();
        queue.run().await?;
        drop(queue);

        let report = match Arc::try_unwrap(report) {
            Ok(report) => report.into_inner(),
            Err(shared) => shared.lock().await.clone(),
        };
        info!(
            sent = report.num_recipients(),
            failed = report.num_failed(),
            "bulk message complete"
        );
        Ok(report)
    }

    /// Render `message_template` for `user` without sending it.
    pub async fn create_message_for_user(
        &self,
        user: &User,
        message_template: &str,
    ) -> Result<String, DomainError> {
        self.delivery.render(user, message_template).await
    }

    /// Render `message_template` against [`preview_user`]. No recipients, transport or report.
    pub async fn preview_message(&self, message_template: &str) -> Result<String, DomainError> {
        self.create_message_for_user(&preview_user(), message_template)
            .await
    }

    /// Trim and de-duplicate group names, failing with every unresolvable name.
    fn validate_groups<S: AsRef<str>>(&self, groups: &[S]) -> Result<Vec<String>, DomainError> {
        let mut seen = HashSet::new();
        let mut valid = Vec::with_capacity(groups.len());
        let mut invalid = Vec::new();

        for group in groups {
            let group = group.as_ref().trim();
            if !self.recipient_resolver.can_resolve(group) {
                invalid.push(group.to_string());
            } else if seen.insert(group.to_string()) {
                valid.push(group.to_string());
            }
        }

        if invalid.is_empty() {
            Ok(valid)
        } else {
            Err(DomainError::Validation {
                invalid_groups: invalid,
            })
        }
    }

    /// Resolve all groups concurrently and merge users by `_id`, first seen wins.
    /// Group failures are recorded in `report`.
    async fn resolve_recipients(
        &self,
        groups: &[String],
        report: &Mutex<BulkMessageReport>,
    ) -> Vec<User> {
        let lookups = groups.iter().map(|group| async move {
            let result = self.recipient_resolver.resolve(group).await;
            (group, result)
        });

        let mut seen = HashSet::new();
        let mut recipients = Vec::new();
        for (group, result) in join_all(lookups).await {
            match result {
                Ok(users) => {
                    debug!(group = %group, count = users.len(), "group resolved");
                    recipients.extend(users.into_iter().filter(|u| seen.insert(u.id.clone())));
                }
                Err(e) => {
                    warn!(group = %group, error = %e, "recipient group resolution failed");
                    let message = match e {
                        DomainError::Resolution { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    report.lock().await.record_group_failure(group.as_str(), message);
                }
            }
        }
        recipients
    }
}

/// Constructor-level dependency injection for [`BulkMessageService`].
///
/// Needs a context factory, a recipient resolver or a user service, and a
/// transport or an SMS service. Explicit collaborators take precedence.
#[derive(Default)]
pub struct BulkMessageServiceBuilder {
    recipient_resolver: Option<Arc<dyn RecipientResolver>>,
    user_service: Option<Arc<dyn UserService>>,
    template_resolver: Option<Arc<dyn MessageTemplateResolver>>,
    transport: Option<Arc<dyn MessageTransport>>,
    sms_service: Option<Arc<dyn SmsService>>,
    context_factory: Option<Arc<dyn MessageContextFactory>>,
    concurrency: Option<usize>,
}

impl BulkMessageServiceBuilder {
    pub fn recipient_resolver(mut self, resolver: Arc<dyn RecipientResolver>) -> Self {
        self.recipient_resolver = Some(resolver);
        self
    }

    pub fn user_service(mut self, users: Arc<dyn UserService>) -> Self {
        self.user_service = Some(users);
        self
    }

    pub fn template_resolver(mut self, resolver: Arc<dyn MessageTemplateResolver>) -> Self {
        self.template_resolver = Some(resolver);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn MessageTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn sms_service(mut self, sms: Arc<dyn SmsService>) -> Self {
        self.sms_service = Some(sms);
        self
    }

    pub fn context_factory(mut self, factory: Arc<dyn MessageContextFactory>) -> Self {
        self.context_factory = Some(factory);
        self
    }

    /// Maximum simultaneous deliveries. Defaults to [`DEFAULT_SEND_CONCURRENCY`].
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Validate the wiring and build the service.
    pub fn build(self) -> Result<BulkMessageService, DomainError> {
        let mut missing = Vec::new();

        let recipient_resolver = match (self.recipient_resolver, self.user_service) {
            (Some(resolver), _) => Some(resolver),
            (None, Some(users)) => {
                Some(Arc::new(UserGroupResolver::new(users)) as Arc<dyn RecipientResolver>)
            }
            (None, None) => {
                missing.push("a recipient resolver or user service");
                None
            }
        };
        let transport = match (self.transport, self.sms_service) {
            (Some(transport), _) => Some(transport),
            (None, Some(sms)) => {
                Some(Arc::new(SmsMessageTransport::new(sms)) as Arc<dyn MessageTransport>)
            }
            (None, None) => {
                missing.push("a message transport or SMS service");
                None
            }
        };
        if self.context_factory.is_none() {
            missing.push("a message context factory");
        }
        let concurrency = self.concurrency.unwrap_or(DEFAULT_SEND_CONCURRENCY);
        if concurrency == 0 {
            missing.push("a send concurrency of at least 1");
        }

        match (recipient_resolver, transport, self.context_factory) {
            (Some(recipient_resolver), Some(transport), Some(context_factory))
                if missing.is_empty() =>
            {
                let template_resolver = self
                    .template_resolver
                    .unwrap_or_else(|| Arc::new(PlaceholderTemplateResolver::new()));
                Ok(BulkMessageService {
                    recipient_resolver,
                    delivery: Arc::new(Delivery {
                        context_factory,
                        template_resolver,
                        transport,
                    }),
                    concurrency,
                })
            }
            _ => Err(DomainError::Configuration(format!(
                "BulkMessageService requires {}",
                missing.join(", ")
            ))),
        }
    }
}
