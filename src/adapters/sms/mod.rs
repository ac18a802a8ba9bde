//! SMS adapters. Implement SmsService.
//!
//! Africa's Talking for production, console adapter for dry runs and tests.

pub mod africastalking;
pub mod console;

pub use africastalking::AfricasTalkingSms;
pub use console::ConsoleSms;
