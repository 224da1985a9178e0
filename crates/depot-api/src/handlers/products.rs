// ============================================================================
// Depot API - Product Handlers
// File: crates/depot-api/src/handlers/products.rs
// ============================================================================

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use depot_core::domain::{NewProduct, Product, ProductChanges};
use depot_core::query::ProductQuery;
use depot_shared::utils::non_blank;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Body of create and update. Status and borrow fields are not accepted
/// here; they only change through borrow and return.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub features: Option<String>,
    pub image_url: Option<String>,
    pub location_image: Option<String>,
    pub location: Option<String>,
    pub location_description: Option<String>,
}

impl From<ProductPayload> for NewProduct {
    fn from(p: ProductPayload) -> Self {
        Self {
            name: p.name,
            barcode: p.barcode,
            description: p.description,
            features: p.features,
            image_url: p.image_url,
            location_image: p.location_image,
            location: p.location,
            location_description: p.location_description,
        }
    }
}

impl From<ProductPayload> for ProductChanges {
    fn from(p: ProductPayload) -> Self {
        Self {
            name: p.name,
            barcode: p.barcode,
            description: p.description,
            features: p.features,
            image_url: p.image_url,
            location_image: p.location_image,
            location: p.location,
            location_description: p.location_description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub borrowed_by: Option<String>,
    /// Optional link to a registered user; blank means none.
    pub borrowed_by_user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub location: Option<String>,
    pub location_description: Option<String>,
    pub location_image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatsResponse {
    pub total_count: u64,
    pub in_stock_count: u64,
    pub borrowed_count: u64,
    pub recent_products: Vec<Product>,
    pub recent_borrows: Vec<Product>,
}

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductListParams>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let query = ProductQuery::from_params(
        params.search.as_deref(),
        params.status.as_deref(),
        params.location.as_deref(),
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
        params.page,
        params.limit,
    )?;

    let page = state.products.list(&query).await?;
    Ok(Json(ApiResponse::page(page)))
}

/// GET /api/products/{id}
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state.products.get(&id).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// GET /api/products/barcode/{barcode}
pub async fn get_by_barcode(
    State(state): State<AppState>,
    ApiPath(barcode): ApiPath<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state.products.get_by_barcode(&barcode).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let product = state.products.create(payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(product).with_message("Product created successfully")),
    ))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state.products.update(&id, payload.into()).await?;
    Ok(Json(ApiResponse::success(product).with_message("Product updated successfully")))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.products.delete(&id).await?;
    Ok(Json(ApiResponse::message("Product deleted successfully")))
}

/// POST /api/products/{id}/borrow
pub async fn borrow(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BorrowRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let user_id = match non_blank(payload.borrowed_by_user_id.as_deref()) {
        None => None,
        Some(raw) => Some(
            Uuid::parse_str(&raw)
                .map_err(|_| ApiError::BadRequest("Invalid borrowedByUserId".to_string()))?,
        ),
    };

    let product = state
        .products
        .borrow(&id, payload.borrowed_by.as_deref(), user_id)
        .await?;
    Ok(Json(ApiResponse::success(product).with_message("Product borrowed successfully")))
}

/// POST /api/products/{id}/return
pub async fn return_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ReturnRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state
        .products
        .return_product(
            &id,
            payload.location.as_deref(),
            payload.location_description.as_deref(),
            payload.location_image.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(product).with_message("Product returned successfully")))
}

/// GET /api/products/stats
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductStatsResponse>>, ApiError> {
    let overview = state.products.overview().await?;
    Ok(Json(ApiResponse::success(ProductStatsResponse {
        total_count: overview.stats.total,
        in_stock_count: overview.stats.in_stock,
        borrowed_count: overview.stats.borrowed,
        recent_products: overview.recent_products,
        recent_borrows: overview.recently_borrowed,
    })))
}

/// GET /api/products/locations
pub async fn locations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let names = state.products.location_names().await?;
    Ok(Json(ApiResponse::success(names)))
}
