//! # Depot Infrastructure
//!
//! Adapters for the core ports: PostgreSQL repositories, schema migrations,
//! health probing, JSON backups, and in-process adapters used by tests and
//! offline runs.

pub mod backup;
pub mod database;
pub mod memory;

pub use backup::FileBackupStore;
pub use database::{
    create_lazy_pool, PgHealthProbe, PgLocationRepository, PgProductRepository, PgSchemaManager,
    PgUserRepository,
};
pub use memory::{
    MemoryBackupStore, MemoryLocationRepository, MemoryProductRepository, MemoryUserRepository,
    NoopSchemaManager, StaticHealthProbe,
};
