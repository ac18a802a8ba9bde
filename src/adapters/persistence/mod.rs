//! Persistence adapters: users export (read-only) and saved send reports.

pub mod report_store;
pub mod user_directory;

pub use report_store::{ReportStore, StoredReport};
pub use user_directory::UserDirectory;
