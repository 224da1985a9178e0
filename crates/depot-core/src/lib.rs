//! # Depot Core
//!
//! Domain entities, lifecycle rules, query building, repository ports and
//! services for the warehouse inventory application.

pub mod availability;
pub mod domain;
pub mod error;
pub mod query;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
