//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod error;
pub mod health;
pub mod postgres;
pub mod schema;

pub use connection::create_lazy_pool;
pub use health::PgHealthProbe;
pub use postgres::{PgLocationRepository, PgProductRepository, PgUserRepository};
pub use schema::PgSchemaManager;
