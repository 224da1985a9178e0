//! Location management

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use depot_shared::utils::non_blank;

use crate::domain::{Location, LocationChanges};
use crate::error::DomainError;
use crate::repositories::LocationRepository;

pub struct LocationService {
    locations: Arc<dyn LocationRepository>,
}

impl LocationService {
    pub fn new(locations: Arc<dyn LocationRepository>) -> Self {
        Self { locations }
    }

    pub async fn list(&self, search: Option<&str>, active_only: bool) -> Result<Vec<Location>, DomainError> {
        self.locations.list(non_blank(search), active_only).await
    }

    pub async fn get(&self, id: &Uuid) -> Result<Location, DomainError> {
        self.locations
            .find_by_id(id)
            .await?
            .ok_or(DomainError::LocationNotFound)
    }

    pub async fn create(&self, name: Option<&str>, description: Option<&str>) -> Result<Location, DomainError> {
        let name = non_blank(name)
            .ok_or_else(|| DomainError::ValidationError("Location name is required".to_string()))?;
        let location = Location::new(&name, description)?;
        self.ensure_name_free(&location.name, None).await?;

        let created = self.locations.create(&location).await?;
        info!("Location created: {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: &Uuid, changes: LocationChanges) -> Result<Location, DomainError> {
        let mut location = self.get(id).await?;
        let previous_name = location.name.clone();
        location.apply_changes(&changes)?;

        if !location.name.eq_ignore_ascii_case(&previous_name) {
            self.ensure_name_free(&location.name, Some(id)).await?;
        }

        let updated = self.locations.update(&location).await?;
        info!("Location updated: {}", updated.id);
        Ok(updated)
    }

    pub async fn toggle(&self, id: &Uuid) -> Result<Location, DomainError> {
        let mut location = self.get(id).await?;
        location.toggle();
        let updated = self.locations.update(&location).await?;
        info!("Location {} is now {}", updated.id, if updated.is_active { "active" } else { "inactive" });
        Ok(updated)
    }

    /// Irreversible. Products keep their copied location text.
    pub async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        if !self.locations.delete(id).await? {
            return Err(DomainError::LocationNotFound);
        }
        info!("Location deleted: {}", id);
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, owner: Option<&Uuid>) -> Result<(), DomainError> {
        match self.locations.find_by_name(name).await? {
            Some(existing) if Some(&existing.id) != owner => {
                warn!("Location name already in use: {}", name);
                Err(DomainError::LocationNameAlreadyExists(name.to_string()))
            }
            _ => Ok(()),
        }
    }
}
