// ============================================================================
// Depot API - Access Middleware
// File: crates/depot-api/src/middleware/auth.rs
// ============================================================================
//! Request gates applied with `route_layer(from_fn_with_state(..))`.
//!
//! `require_auth` must run before `require_admin`: the admin gate reads the
//! [`Principal`] extension the auth gate inserts.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use depot_core::services::Principal;

use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the bearer token into a [`Principal`] request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?
        .to_string();

    let principal = state.access.authenticate(&token).await?;
    debug!("Authenticated {} ({})", principal.id, principal.role.as_str());

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Rejects the request unless the authenticated principal is an admin.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

    state.access.require_admin(principal)?;
    Ok(next.run(request).await)
}

/// Short-circuits with 503 while the datastore is unreachable.
pub async fn require_datastore(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.datastore.ensure_available()?;
    Ok(next.run(request).await)
}
