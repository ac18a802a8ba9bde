//! welfare-notify: bulk SMS messaging for a membership-welfare app, Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
