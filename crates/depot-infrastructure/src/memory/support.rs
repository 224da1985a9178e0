use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use depot_core::availability::HealthProbe;
use depot_core::error::DomainError;
use depot_core::repositories::{BackupSnapshot, BackupStore, SchemaManager};

/// Probe whose answer is set by hand.
pub struct StaticHealthProbe {
    up: AtomicBool,
}

impl StaticHealthProbe {
    pub fn new(up: bool) -> Self {
        Self {
            up: AtomicBool::new(up),
        }
    }

    pub fn set_available(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }
}

#[async_trait]
impl HealthProbe for StaticHealthProbe {
    async fn ping(&self) -> bool {
        self.up.load(Ordering::SeqCst)
    }
}

pub struct NoopSchemaManager;

#[async_trait]
impl SchemaManager for NoopSchemaManager {
    async fn sync_schema(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Keeps serialized snapshots in memory.
#[derive(Default)]
pub struct MemoryBackupStore {
    snapshots: RwLock<Vec<String>>,
}

impl MemoryBackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshots(&self) -> Vec<String> {
        self.snapshots.read().await.clone()
    }
}

#[async_trait]
impl BackupStore for MemoryBackupStore {
    async fn write(&self, snapshot: &BackupSnapshot) -> Result<String, DomainError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        self.snapshots.write().await.push(json);
        Ok(format!("memory://depot-backup-{}.json", snapshot.backup_id))
    }
}
