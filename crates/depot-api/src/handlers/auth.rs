// ============================================================================
// Depot API - Auth Handlers
// File: crates/depot-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (register, login, logout, me)

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use depot_core::domain::User;
use depot_core::services::{AuthResult, Principal, RegisterInput};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Register request payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token issued on register and login. Sits at the top level of the
/// envelope rather than under `data`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: User,
    pub timestamp: String,
}

impl AuthResponse {
    fn new(message: &str, result: AuthResult) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            token: result.token,
            user: result.user,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Borrower picker entry
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Principal,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let result = state
        .auth
        .register(RegisterInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            confirm_password: payload.confirm_password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("Registration successful", result)),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let result = state
        .auth
        .login(
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(AuthResponse::new("Login successful", result)))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Logged out successfully"))
}

/// GET /api/auth/me
pub async fn me(Extension(principal): Extension<Principal>) -> Json<ApiResponse<MeResponse>> {
    let degraded = !principal.resolved;
    let response = ApiResponse::success(MeResponse { user: principal });
    if degraded {
        Json(response.with_warning("Database unavailable, profile built from token claims"))
    } else {
        Json(response)
    }
}

/// GET /api/auth/users
pub async fn active_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let users = state
        .users
        .active_users()
        .await?
        .into_iter()
        .map(|user| UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        })
        .collect();

    Ok(Json(ApiResponse::success(users)))
}
