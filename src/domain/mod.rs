//! Domain layer: models and ports with no I/O dependencies.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
