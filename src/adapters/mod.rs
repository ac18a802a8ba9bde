//! Infrastructure adapters. Implement outbound ports.
//!
//! SMS providers, users file, saved reports, terminal UI. Map errors to DomainError.

pub mod persistence;
pub mod sms;
pub mod ui;
