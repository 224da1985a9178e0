// ============================================================================
// Depot Core - User Administration Service
// File: crates/depot-core/src/services/user_service.rs
// ============================================================================
//! Admin user management. An actor can never deactivate or delete their
//! own account, whatever their role.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use depot_security::PasswordService;
use depot_shared::types::Page;
use depot_shared::utils::{mask_email, non_blank};

use crate::domain::{normalize_email, validate_password, Role, User};
use crate::error::DomainError;
use crate::query::UserQuery;
use crate::repositories::{UserRepository, UserStats};

#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError> {
        self.users.list(query).await
    }

    /// Borrower candidates.
    pub async fn active_users(&self) -> Result<Vec<User>, DomainError> {
        self.users.list_active().await
    }

    pub async fn get(&self, id: &Uuid) -> Result<User, DomainError> {
        self.users.find_by_id(id).await?.ok_or(DomainError::UserNotFound)
    }

    pub async fn stats(&self) -> Result<UserStats, DomainError> {
        self.users.stats().await
    }

    pub async fn create(&self, input: CreateUserInput) -> Result<User, DomainError> {
        let name = non_blank(input.name.as_deref())
            .ok_or_else(|| DomainError::ValidationError("Name is required".to_string()))?;
        let email = non_blank(input.email.as_deref())
            .map(|e| normalize_email(&e))
            .ok_or_else(|| DomainError::ValidationError("Email is required".to_string()))?;
        let password = input.password.unwrap_or_default();
        validate_password(&password)?;
        // Unknown roles fall back to a regular account.
        let role = input
            .role
            .as_deref()
            .and_then(Role::from_str)
            .unwrap_or_default();

        self.ensure_email_free(&email, None).await?;

        let password_hash = PasswordService::hash(&password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        let user = User::new(&name, &email, password_hash, role)?;
        let created = self.users.create(&user).await?;
        info!("User created by admin: {} ({})", created.id, mask_email(&created.email));
        Ok(created)
    }

    pub async fn update(&self, actor: &Uuid, id: &Uuid, input: UpdateUserInput) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;

        if actor == id && input.is_active == Some(false) {
            warn!("User {} attempted to deactivate their own account", actor);
            return Err(DomainError::SelfModificationForbidden(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        if let Some(name) = non_blank(input.name.as_deref()) {
            user.name = name;
        }
        if let Some(email) = non_blank(input.email.as_deref()).map(|e| normalize_email(&e)) {
            if email != user.email {
                self.ensure_email_free(&email, Some(id)).await?;
                user.email = email;
            }
        }
        if let Some(role) = input.role.as_deref().and_then(Role::from_str) {
            user.role = role;
        }
        if let Some(is_active) = input.is_active {
            user.is_active = is_active;
        }
        user.touch();
        user.validate()?;

        let updated = self.users.update(&user).await?;
        info!("User updated: {}", updated.id);
        Ok(updated)
    }

    /// Soft delete.
    pub async fn delete(&self, actor: &Uuid, id: &Uuid) -> Result<(), DomainError> {
        if actor == id {
            warn!("User {} attempted to delete their own account", actor);
            return Err(DomainError::SelfModificationForbidden(
                "You cannot delete your own account".to_string(),
            ));
        }

        let mut user = self.get(id).await?;
        user.is_active = false;
        user.touch();
        self.users.update(&user).await?;
        info!("User deleted: {}", id);
        Ok(())
    }

    pub async fn toggle_status(&self, actor: &Uuid, id: &Uuid) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;
        if actor == id && user.is_active {
            warn!("User {} attempted to deactivate their own account", actor);
            return Err(DomainError::SelfModificationForbidden(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        user.is_active = !user.is_active;
        user.touch();
        let updated = self.users.update(&user).await?;
        info!("User {} is now {}", updated.id, if updated.is_active { "active" } else { "inactive" });
        Ok(updated)
    }

    /// Creates the bootstrap administrator unless an account with that
    /// email already exists. Returns the new account, if one was created.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        if self.users.find_by_email(&normalize_email(email)).await?.is_some() {
            return Ok(None);
        }

        let admin = self
            .create(CreateUserInput {
                name: Some(name.to_string()),
                email: Some(email.to_string()),
                password: Some(password.to_string()),
                role: Some(Role::Admin.as_str().to_string()),
            })
            .await?;
        info!("Bootstrap administrator created: {}", admin.id);
        Ok(Some(admin))
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<&Uuid>) -> Result<(), DomainError> {
        match self.users.find_by_email(email).await? {
            Some(existing) if Some(&existing.id) != owner => {
                Err(DomainError::EmailAlreadyExists(email.to_string()))
            }
            _ => Ok(()),
        }
    }
}
