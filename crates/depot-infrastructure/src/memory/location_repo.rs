use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use depot_core::domain::Location;
use depot_core::error::DomainError;
use depot_core::repositories::LocationRepository;

#[derive(Default)]
pub struct MemoryLocationRepository {
    locations: RwLock<HashMap<Uuid, Location>>,
}

impl MemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_taken(locations: &HashMap<Uuid, Location>, location: &Location) -> bool {
        let name = location.name.to_lowercase();
        locations
            .values()
            .any(|l| l.id != location.id && l.name.to_lowercase() == name)
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationRepository {
    async fn list(&self, search: Option<String>, active_only: bool) -> Result<Vec<Location>, DomainError> {
        let needle = search.map(|s| s.to_lowercase());
        let mut matching: Vec<Location> = self
            .locations
            .read()
            .await
            .values()
            .filter(|l| !active_only || l.is_active)
            .filter(|l| {
                needle
                    .as_ref()
                    .is_none_or(|n| l.name.to_lowercase().contains(n.as_str()))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Location>, DomainError> {
        Ok(self.locations.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Location>, DomainError> {
        let name = name.to_lowercase();
        Ok(self
            .locations
            .read()
            .await
            .values()
            .find(|l| l.name.to_lowercase() == name)
            .cloned())
    }

    async fn create(&self, location: &Location) -> Result<Location, DomainError> {
        let mut locations = self.locations.write().await;
        if Self::name_taken(&locations, location) {
            return Err(DomainError::LocationNameAlreadyExists(location.name.clone()));
        }
        locations.insert(location.id, location.clone());
        Ok(location.clone())
    }

    async fn update(&self, location: &Location) -> Result<Location, DomainError> {
        let mut locations = self.locations.write().await;
        if !locations.contains_key(&location.id) {
            return Err(DomainError::LocationNotFound);
        }
        if Self::name_taken(&locations, location) {
            return Err(DomainError::LocationNameAlreadyExists(location.name.clone()));
        }
        locations.insert(location.id, location.clone());
        Ok(location.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        Ok(self.locations.write().await.remove(id).is_some())
    }
}
