//! JSON backups on the local filesystem

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info};

use depot_core::error::DomainError;
use depot_core::repositories::{BackupSnapshot, BackupStore};

pub struct FileBackupStore {
    dir: PathBuf,
}

impl FileBackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl BackupStore for FileBackupStore {
    async fn write(&self, snapshot: &BackupSnapshot) -> Result<String, DomainError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            error!("Cannot create backup directory {}: {}", self.dir.display(), e);
            DomainError::InternalError(format!("Backup directory unavailable: {}", e))
        })?;

        let path = self.dir.join(format!("depot-backup-{}.json", snapshot.backup_id));
        let body = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        tokio::fs::write(&path, body).await.map_err(|e| {
            error!("Cannot write backup {}: {}", path.display(), e);
            DomainError::InternalError(format!("Backup write failed: {}", e))
        })?;

        info!("Backup written to {}", path.display());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_writes_snapshot_file() {
        let dir = std::env::temp_dir().join(format!("depot-backup-test-{}", Uuid::new_v4()));
        let store = FileBackupStore::new(&dir);
        let snapshot = BackupSnapshot {
            backup_id: Uuid::new_v4(),
            created_at: Utc::now(),
            users: vec![],
            locations: vec![],
            products: vec![],
        };

        let path = store.write(&snapshot).await.unwrap();
        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(body.contains(&snapshot.backup_id.to_string()));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
