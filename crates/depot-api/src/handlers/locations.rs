// ============================================================================
// Depot API - Location Handlers
// File: crates/depot-api/src/handlers/locations.rs
// ============================================================================

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use depot_core::domain::{Location, LocationChanges};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationListParams {
    pub search: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/locations
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocationListParams>,
) -> Result<Json<ApiResponse<Vec<Location>>>, ApiError> {
    let locations = state
        .locations
        .list(params.search.as_deref(), params.active_only)
        .await?;
    Ok(Json(ApiResponse::success(locations)))
}

/// GET /api/locations/{id}
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Location>>, ApiError> {
    let location = state.locations.get(&id).await?;
    Ok(Json(ApiResponse::success(location)))
}

/// POST /api/locations
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LocationPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Location>>), ApiError> {
    let location = state
        .locations
        .create(payload.name.as_deref(), payload.description.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(location).with_message("Location created successfully")),
    ))
}

/// PUT /api/locations/{id}
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<LocationPayload>,
) -> Result<Json<ApiResponse<Location>>, ApiError> {
    let changes = LocationChanges {
        name: payload.name,
        description: payload.description,
        is_active: payload.is_active,
    };
    let location = state.locations.update(&id, changes).await?;
    Ok(Json(ApiResponse::success(location).with_message("Location updated successfully")))
}

/// PATCH /api/locations/{id}/toggle
pub async fn toggle(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Location>>, ApiError> {
    let location = state.locations.toggle(&id).await?;
    let message = if location.is_active {
        "Location activated"
    } else {
        "Location deactivated"
    };
    Ok(Json(ApiResponse::success(location).with_message(message)))
}

/// DELETE /api/locations/{id}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.locations.delete(&id).await?;
    Ok(Json(ApiResponse::message("Location deleted successfully")))
}
