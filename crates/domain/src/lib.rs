pub mod errors;
pub mod models;
pub mod ports;
pub mod repositories;
pub mod services;

pub use errors::{DomainError, DomainResult};
