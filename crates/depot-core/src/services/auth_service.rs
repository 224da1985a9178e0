// ============================================================================
// Depot Core - Authentication Service
// File: crates/depot-core/src/services/auth_service.rs
// ============================================================================
//! Registration and login

use std::sync::Arc;

use tracing::{error, info, warn};

use depot_security::{JwtService, PasswordService};
use depot_shared::utils::{mask_email, non_blank};

use crate::domain::{normalize_email, validate_password, Role, User};
use crate::error::DomainError;
use crate::repositories::UserRepository;

/// Registration form as submitted.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Issued token plus the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub user: User,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<AuthResult, DomainError> {
        let (Some(name), Some(email), Some(password), Some(confirm)) = (
            non_blank(input.name.as_deref()),
            non_blank(input.email.as_deref()),
            input.password.filter(|p| !p.is_empty()),
            input.confirm_password.filter(|p| !p.is_empty()),
        ) else {
            return Err(DomainError::ValidationError("All fields are required".to_string()));
        };

        if password != confirm {
            return Err(DomainError::ValidationError("Passwords do not match".to_string()));
        }
        validate_password(&password)?;

        let email = normalize_email(&email);
        info!("Registration attempt for email: {}", mask_email(&email));

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Registration failed: email already exists: {}", mask_email(&email));
            return Err(DomainError::EmailAlreadyExists(email));
        }

        let password_hash = PasswordService::hash(&password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        let user = User::new(&name, &email, password_hash, Role::User)?;
        let created = self.users.create(&user).await?;

        let token = self.issue_token(&created)?;
        info!("Registration successful for user {}", created.id);
        Ok(AuthResult { token, user: created })
    }

    /// Unknown, inactive and wrong-password logins all fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, DomainError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::ValidationError("Email and password are required".to_string()));
        }

        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            warn!("Login failed: unknown email {}", mask_email(&email));
            DomainError::InvalidCredentials
        })?;

        if !user.is_active {
            warn!("Login failed: inactive user {}", user.id);
            return Err(DomainError::InvalidCredentials);
        }

        let valid = PasswordService::verify(password, &user.password_hash).map_err(|e| {
            error!("Password verification failed for user {}: {}", user.id, e);
            DomainError::InvalidCredentials
        })?;
        if !valid {
            warn!("Login failed: invalid password for user {}", user.id);
            return Err(DomainError::InvalidCredentials);
        }

        let mut user = user;
        user.record_login();
        let user = match self.users.update(&user).await {
            Ok(updated) => updated,
            Err(e) => {
                error!("Failed to record last login for {}: {}", user.id, e);
                user
            }
        };

        let token = self.issue_token(&user)?;
        info!("Login successful for user {}", user.id);
        Ok(AuthResult { token, user })
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.jwt
            .generate_token(&user.id, &user.email, &user.name)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))
    }
}
