//! Embedded schema migrations

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

use depot_core::error::DomainError;
use depot_core::repositories::SchemaManager;

pub struct PgSchemaManager {
    pool: PgPool,
}

impl PgSchemaManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaManager for PgSchemaManager {
    async fn sync_schema(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| {
                error!("Migration failed: {}", e);
                match e {
                    sqlx::migrate::MigrateError::Execute(inner) => {
                        super::error::map_sqlx_error("running migrations", inner)
                    }
                    other => DomainError::DatabaseError(other.to_string()),
                }
            })?;
        info!("Database schema is up to date");
        Ok(())
    }
}
