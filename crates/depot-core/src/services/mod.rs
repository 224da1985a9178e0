//! Domain services

pub mod access_service;
pub mod auth_service;
pub mod location_service;
pub mod maintenance_service;
pub mod product_service;
pub mod user_service;

pub use access_service::{AccessService, Principal};
pub use auth_service::{AuthResult, AuthService, RegisterInput};
pub use location_service::LocationService;
pub use maintenance_service::{BackupReport, MaintenanceService, SyncReport};
pub use product_service::{ProductOverview, ProductService};
pub use user_service::{CreateUserInput, UpdateUserInput, UserService};
