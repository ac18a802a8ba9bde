//! Application use cases. Orchestrate domain logic via ports.

pub mod batch_job_queue;
pub mod bulk_message_service;
pub mod context;
pub mod recipient_resolver;
pub mod template;
pub mod transport;

pub use batch_job_queue::{BatchJobQueue, DEFAULT_SEND_CONCURRENCY};
pub use bulk_message_service::{BulkMessageService, BulkMessageServiceBuilder, preview_user};
pub use context::StandardContextFactory;
pub use recipient_resolver::UserGroupResolver;
pub use template::PlaceholderTemplateResolver;
pub use transport::SmsMessageTransport;
