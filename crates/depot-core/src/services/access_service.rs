// ============================================================================
// Depot Core - Access Service
// File: crates/depot-core/src/services/access_service.rs
// ============================================================================
//! Bearer token authentication and role checks

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use depot_security::{Claims, JwtError, JwtService};

use crate::availability::DatastoreStatus;
use crate::domain::{Role, User};
use crate::error::DomainError;
use crate::repositories::UserRepository;

/// The acting user of a request.
///
/// `resolved` is `false` when the principal was built from token claims
/// alone because the datastore could not be reached; its role is then
/// unknown and reported as `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip)]
    pub resolved: bool,
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> Result<Self, DomainError> {
        let id = claims
            .user_id()
            .map_err(|_| DomainError::Unauthenticated("Invalid token".to_string()))?;
        Ok(Self {
            id,
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: Role::User,
            resolved: false,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.resolved && self.role == Role::Admin
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            resolved: true,
        }
    }
}

pub struct AccessService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    datastore: Arc<DatastoreStatus>,
}

impl AccessService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt: Arc<JwtService>,
        datastore: Arc<DatastoreStatus>,
    ) -> Self {
        Self { users, jwt, datastore }
    }

    /// Validates the token and resolves the principal behind it.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            JwtError::TokenExpired => DomainError::Unauthenticated("Token expired".to_string()),
            _ => DomainError::Unauthenticated("Invalid token".to_string()),
        })?;

        if !self.datastore.is_available() {
            return Principal::from_claims(&claims);
        }

        let id = claims
            .user_id()
            .map_err(|_| DomainError::Unauthenticated("Invalid token".to_string()))?;

        match self.users.find_by_id(&id).await {
            Ok(Some(user)) if user.is_active => Ok(Principal::from(&user)),
            Ok(Some(_)) => {
                warn!("Rejected token of inactive user {}", id);
                Err(DomainError::Unauthenticated("Account is inactive".to_string()))
            }
            Ok(None) => {
                warn!("Rejected token of unknown user {}", id);
                Err(DomainError::Unauthenticated("User no longer exists".to_string()))
            }
            Err(DomainError::DatastoreUnavailable) => {
                warn!("Datastore unreachable, using token claims for {}", id);
                Principal::from_claims(&claims)
            }
            Err(e) => Err(e),
        }
    }

    /// Admin gate. An unresolved principal cannot prove its role.
    pub fn require_admin(&self, principal: &Principal) -> Result<(), DomainError> {
        if !principal.resolved {
            return Err(DomainError::DatastoreUnavailable);
        }
        if principal.role != Role::Admin {
            warn!("Admin access denied for user {}", principal.id);
            return Err(DomainError::Forbidden);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::MockHealthProbe;
    use crate::repositories::MockUserRepository;

    const SECRET: &str = "access-service-test-secret";

    async fn status(available: bool) -> Arc<DatastoreStatus> {
        let mut probe = MockHealthProbe::new();
        probe.expect_ping().returning(move || available);
        let status = Arc::new(DatastoreStatus::new(Arc::new(probe)));
        status.refresh().await;
        status
    }

    fn service(users: MockUserRepository, datastore: Arc<DatastoreStatus>) -> (AccessService, Arc<JwtService>) {
        let jwt = Arc::new(JwtService::from_hours(SECRET, 24));
        (AccessService::new(Arc::new(users), jwt.clone(), datastore), jwt)
    }

    fn admin() -> User {
        User::new("Admin", "admin@example.com", "hash".into(), Role::Admin).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_resolves_user() {
        let user = admin();
        let stored = user.clone();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |_| Ok(Some(stored.clone())));

        let (access, jwt) = service(users, status(true).await);
        let token = jwt.generate_token(&user.id, &user.email, &user.name).unwrap();

        let principal = access.authenticate(&token).await.unwrap();
        assert!(principal.resolved);
        assert!(principal.is_admin());
        assert!(access.require_admin(&principal).is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let (access, _) = service(MockUserRepository::new(), status(true).await);
        assert!(matches!(
            access.authenticate("not-a-token").await,
            Err(DomainError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_inactive_user() {
        let mut user = admin();
        user.is_active = false;
        let stored = user.clone();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |_| Ok(Some(stored.clone())));

        let (access, jwt) = service(users, status(true).await);
        let token = jwt.generate_token(&user.id, &user.email, &user.name).unwrap();
        assert!(matches!(
            access.authenticate(&token).await,
            Err(DomainError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_degraded_principal_from_claims() {
        let user = admin();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();

        let (access, jwt) = service(users, status(false).await);
        let token = jwt.generate_token(&user.id, &user.email, &user.name).unwrap();

        let principal = access.authenticate(&token).await.unwrap();
        assert!(!principal.resolved);
        assert_eq!(principal.id, user.id);
        assert_eq!(principal.email, user.email);
        assert!(matches!(
            access.require_admin(&principal),
            Err(DomainError::DatastoreUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_request() {
        let user = admin();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Err(DomainError::DatastoreUnavailable));

        let (access, jwt) = service(users, status(true).await);
        let token = jwt.generate_token(&user.id, &user.email, &user.name).unwrap();
        let principal = access.authenticate(&token).await.unwrap();
        assert!(!principal.resolved);
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let (access, _) = service(MockUserRepository::new(), status(true).await);
        let user = User::new("Bob", "bob@example.com", "hash".into(), Role::User).unwrap();
        assert!(matches!(
            access.require_admin(&Principal::from(&user)),
            Err(DomainError::Forbidden)
        ));
    }
}
