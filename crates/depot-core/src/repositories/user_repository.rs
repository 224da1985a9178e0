//! User repository trait (port)

use async_trait::async_trait;
use depot_shared::types::Page;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::User;
use crate::error::DomainError;
use crate::query::UserQuery;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub admins: u64,
    pub regular: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError>;
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn create(&self, user: &User) -> Result<User, DomainError>;
    async fn update(&self, user: &User) -> Result<User, DomainError>;
    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError>;
    /// Active users ordered by name.
    async fn list_active(&self) -> Result<Vec<User>, DomainError>;
    async fn stats(&self) -> Result<UserStats, DomainError>;
    /// Every row, active or not, for backups.
    async fn list_all(&self) -> Result<Vec<User>, DomainError>;
}
