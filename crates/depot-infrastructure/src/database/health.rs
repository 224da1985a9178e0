//! Datastore health probe

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use depot_core::availability::HealthProbe;

pub struct PgHealthProbe {
    pool: PgPool,
}

impl PgHealthProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    async fn ping(&self) -> bool {
        match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Health probe failed: {}", e);
                false
            }
        }
    }
}
