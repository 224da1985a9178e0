//! Repository traits (ports)

pub mod location_repository;
pub mod maintenance;
pub mod product_repository;
pub mod user_repository;

pub use location_repository::LocationRepository;
pub use maintenance::{BackupSnapshot, BackupStore, SchemaManager};
pub use product_repository::{ProductRepository, ProductStats};
pub use user_repository::{UserRepository, UserStats};

#[cfg(test)]
pub use location_repository::MockLocationRepository;
#[cfg(test)]
pub use maintenance::{MockBackupStore, MockSchemaManager};
#[cfg(test)]
pub use product_repository::MockProductRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
