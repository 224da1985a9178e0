//! Maintenance ports: schema sync and backups

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Location, Product, User};
use crate::error::DomainError;

/// Point-in-time export. Users serialize without password hashes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub backup_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub users: Vec<User>,
    pub locations: Vec<Location>,
    pub products: Vec<Product>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaManager: Send + Sync {
    /// Applies pending migrations.
    async fn sync_schema(&self) -> Result<(), DomainError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Persists the snapshot and returns where it was written.
    async fn write(&self, snapshot: &BackupSnapshot) -> Result<String, DomainError>;
}
