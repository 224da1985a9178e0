// ============================================================================
// Depot Core - User Entity
// File: crates/depot-core/src/domain/user.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use depot_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

use crate::error::DomainError;

/// Role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// Registered account. The password hash never leaves the process in
/// serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[validate(length(min = 2, max = 255, message = "Name must be between 2 and 255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: &str,
        email: &str,
        password_hash: String,
        role: Role,
    ) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let user = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };

        user.validate()?;
        Ok(user)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login = Some(now);
        self.updated_at = now;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Length rule applied to raw passwords before hashing.
pub fn validate_password(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if password.trim().is_empty() || len < MIN_PASSWORD_LENGTH {
        return Err(DomainError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(DomainError::ValidationError("Password too long".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_normalizes_email() {
        let user = User::new(" Alice ", " Alice@Example.COM ", "hash".into(), Role::User).unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert!(user.is_active);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_invalid_user_rejected() {
        assert!(User::new("A", "a@example.com", "hash".into(), Role::User).is_err());
        assert!(User::new("Alice", "not-an-email", "hash".into(), Role::User).is_err());
    }

    #[test]
    fn test_password_never_serialized() {
        let user = User::new("Alice", "a@example.com", "secret-hash".into(), Role::Admin).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"admin\""));
        assert!(json.contains("isActive"));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("      ").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_role_roundtrip() {
        assert_eq!(Role::from_str(Role::Admin.as_str()), Some(Role::Admin));
        assert_eq!(Role::from_str("root"), None);
    }
}
