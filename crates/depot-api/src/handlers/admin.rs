// ============================================================================
// Depot API - Admin Handlers
// File: crates/depot-api/src/handlers/admin.rs
// ============================================================================
//! User management, statistics and maintenance endpoints. Everything here
//! except `sync_db` sits behind the admin gate; `sync_db` re-resolves the
//! caller itself because it has to work while the datastore is down.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use depot_core::domain::User;
use depot_core::query::UserQuery;
use depot_core::repositories::UserStats;
use depot_core::services::{BackupReport, CreateUserInput, Principal, SyncReport, UpdateUserInput};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    pub search: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProductCounts {
    pub total: u64,
    pub borrowed: u64,
    pub available: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub users: UserStats,
    pub products: ProductCounts,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let query = UserQuery::from_params(
        params.search.as_deref(),
        params.role.as_deref(),
        params.is_active,
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
        params.page,
        params.limit,
    )?;

    let page = state.users.list(&query).await?;
    Ok(Json(ApiResponse::page(page)))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.get(&id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state
        .users
        .create(CreateUserInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            role: payload.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user).with_message("User created successfully")),
    ))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .users
        .update(
            &actor.id,
            &id,
            UpdateUserInput {
                name: payload.name,
                email: payload.email,
                role: payload.role,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(user).with_message("User updated successfully")))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.users.delete(&actor.id, &id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

/// PATCH /api/admin/users/{id}/toggle-status
pub async fn toggle_user_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.toggle_status(&actor.id, &id).await?;
    let message = if user.is_active {
        "User activated"
    } else {
        "User deactivated"
    };
    Ok(Json(ApiResponse::success(user).with_message(message)))
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<ApiResponse<AdminStats>>, ApiError> {
    let users = state.users.stats().await?;
    let products = state.products.stats().await?;

    Ok(Json(ApiResponse::success(AdminStats {
        users,
        products: ProductCounts {
            total: products.total,
            borrowed: products.borrowed,
            available: products.in_stock,
        },
    })))
}

/// POST /api/admin/sync-db
pub async fn sync_db(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let report = state.maintenance.sync(&actor).await?;
    Ok(Json(ApiResponse::success(report).with_message("Database synchronized")))
}

/// POST /api/admin/backup
pub async fn backup(
    State(state): State<AppState>,
    Extension(actor): Extension<Principal>,
) -> Result<Json<ApiResponse<BackupReport>>, ApiError> {
    let report = state.maintenance.backup(&actor).await?;
    Ok(Json(ApiResponse::success(report).with_message("Backup completed")))
}
