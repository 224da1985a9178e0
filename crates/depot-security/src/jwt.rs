//! JWT token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

/// Token payload. `sub` carries the user id; `email` and `name` let the API
/// build a principal when the datastore cannot be reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::ValidationError(e.to_string()))
    }
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: i64,
}

impl JwtService {
    /// `token_expiry` is in seconds.
    pub fn new(secret: &str, token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry,
        }
    }

    pub fn from_hours(secret: &str, hours: i64) -> Self {
        Self::new(secret, hours * 3600)
    }

    pub fn generate_token(&self, user_id: &Uuid, email: &str, name: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_expiry)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::ValidationError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_carries_identity() {
        let service = JwtService::from_hours("test-secret", 24);
        let id = Uuid::new_v4();
        let token = service.generate_token(&id, "alice@example.com", "Alice").unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let issuer = JwtService::from_hours("secret-a", 1);
        let verifier = JwtService::from_hours("secret-b", 1);
        let token = issuer.generate_token(&Uuid::new_v4(), "a@b.c", "A").unwrap();
        assert!(matches!(verifier.validate_token(&token), Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new("test-secret", -120);
        let token = service.generate_token(&Uuid::new_v4(), "a@b.c", "A").unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_garbage_rejected() {
        let service = JwtService::from_hours("test-secret", 1);
        assert!(service.validate_token("not-a-token").is_err());
    }
}
