//! Schema sync and backups (admin operations)

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::availability::DatastoreStatus;
use crate::error::DomainError;
use crate::repositories::{BackupSnapshot, BackupStore, LocationRepository, ProductRepository, SchemaManager, UserRepository};
use crate::services::access_service::Principal;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub database_status: &'static str,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupReport {
    pub backup_id: Uuid,
    pub status: &'static str,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

pub struct MaintenanceService {
    users: Arc<dyn UserRepository>,
    locations: Arc<dyn LocationRepository>,
    products: Arc<dyn ProductRepository>,
    schema: Arc<dyn SchemaManager>,
    backups: Arc<dyn BackupStore>,
    datastore: Arc<DatastoreStatus>,
}

impl MaintenanceService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        locations: Arc<dyn LocationRepository>,
        products: Arc<dyn ProductRepository>,
        schema: Arc<dyn SchemaManager>,
        backups: Arc<dyn BackupStore>,
        datastore: Arc<DatastoreStatus>,
    ) -> Self {
        Self {
            users,
            locations,
            products,
            schema,
            backups,
            datastore,
        }
    }

    /// Reconnects, applies pending migrations and reports the resulting
    /// availability.
    ///
    /// Reachable while the store is down, so the actor may arrive unresolved.
    /// A resolved actor's role is checked before the store is probed; an
    /// unresolved one is looked up once the store answers again.
    pub async fn sync(&self, actor: &Principal) -> Result<SyncReport, DomainError> {
        if actor.resolved && !actor.is_admin() {
            warn!("Schema sync denied for non-admin {}", actor.id);
            return Err(DomainError::Forbidden);
        }

        if !self.datastore.refresh().await {
            warn!("Schema sync requested by {} while datastore is unreachable", actor.id);
            return Err(DomainError::DatastoreUnavailable);
        }

        if !actor.resolved {
            let user = self
                .users
                .find_by_id(&actor.id)
                .await?
                .filter(|u| u.is_active)
                .ok_or_else(|| DomainError::Unauthenticated("User no longer exists".to_string()))?;
            if !user.is_admin() {
                warn!("Schema sync denied for non-admin {}", actor.id);
                return Err(DomainError::Forbidden);
            }
        }

        if let Err(e) = self.schema.sync_schema().await {
            error!("Schema sync failed: {}", e);
            return Err(e);
        }
        self.datastore.refresh().await;

        info!("Schema synchronized by {}", actor.id);
        Ok(SyncReport {
            database_status: self.datastore.status_label(),
            synced_at: Utc::now(),
        })
    }

    pub async fn backup(&self, actor: &Principal) -> Result<BackupReport, DomainError> {
        let snapshot = BackupSnapshot {
            backup_id: Uuid::new_v4(),
            created_at: Utc::now(),
            users: self.users.list_all().await?,
            locations: self.locations.list(None, false).await?,
            products: self.products.list_all().await?,
        };

        let path = self.backups.write(&snapshot).await.map_err(|e| {
            error!("Backup {} failed: {}", snapshot.backup_id, e);
            e
        })?;

        info!(
            "Backup {} written by {}: {} users, {} locations, {} products",
            snapshot.backup_id,
            actor.id,
            snapshot.users.len(),
            snapshot.locations.len(),
            snapshot.products.len()
        );
        Ok(BackupReport {
            backup_id: snapshot.backup_id,
            status: "completed",
            path,
            created_at: snapshot.created_at,
        })
    }
}
