//! # Depot Core - Domain Module
//!
//! Domain entities for the depot application.

pub mod image_ref;
pub mod location;
pub mod product;
pub mod user;

// Re-export all entities and enums
pub use image_ref::{sanitize_image_ref, sanitize_or_keep};
pub use location::{Location, LocationChanges};
pub use product::{BorrowEntry, NewProduct, Product, ProductChanges, ProductStatus, ReturnEntry};
pub use user::{normalize_email, validate_password, Role, User};
