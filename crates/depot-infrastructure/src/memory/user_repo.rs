use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use depot_core::domain::{Role, User};
use depot_core::error::DomainError;
use depot_core::query::UserQuery;
use depot_core::repositories::{UserRepository, UserStats};
use depot_shared::types::Page;

use super::paginate;

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: &Uuid) -> bool {
        users
            .values()
            .any(|u| &u.id != except && u.email.eq_ignore_ascii_case(email))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &user.email, &user.id) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(DomainError::UserNotFound);
        }
        if Self::email_taken(&users, &user.email, &user.id) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError> {
        let users = self.users.read().await;
        let mut matching: Vec<User> = users
            .values()
            .filter(|u| query.filter.matches(u))
            .cloned()
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));
        Ok(paginate(&matching, query.page))
    }

    async fn list_active(&self) -> Result<Vec<User>, DomainError> {
        let mut active: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(active)
    }

    async fn stats(&self) -> Result<UserStats, DomainError> {
        let users = self.users.read().await;
        let total = users.len() as u64;
        let active = users.values().filter(|u| u.is_active).count() as u64;
        let active_with = |role: Role| {
            users
                .values()
                .filter(|u| u.is_active && u.role == role)
                .count() as u64
        };
        Ok(UserStats {
            total,
            active,
            inactive: total - active,
            admins: active_with(Role::Admin),
            regular: active_with(Role::User),
        })
    }

    async fn list_all(&self) -> Result<Vec<User>, DomainError> {
        let mut all: Vec<User> = self.users.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}
