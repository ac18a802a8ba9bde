//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the bulk-send report and errors live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod report;

pub use entities::{MessageContext, User};
pub use errors::DomainError;
pub use report::{BulkMessageReport, DeliveryFailure, SentRecipient};
