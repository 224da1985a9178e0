//! # Depot API
//!
//! HTTP handlers, middleware, DTOs and the router for the depot service.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::{Adapters, AppState};
