//! Location repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Location;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Newest first. `search` is a case-insensitive substring of the name.
    async fn list(&self, search: Option<String>, active_only: bool) -> Result<Vec<Location>, DomainError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Location>, DomainError>;
    /// Case-insensitive lookup.
    async fn find_by_name(&self, name: &str) -> Result<Option<Location>, DomainError>;
    async fn create(&self, location: &Location) -> Result<Location, DomainError>;
    async fn update(&self, location: &Location) -> Result<Location, DomainError>;
    /// Hard delete. Returns `false` when nothing was removed.
    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError>;
}
