//! Dashboard landing data

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use depot_core::domain::Product;
use depot_core::error::DomainError;
use depot_core::repositories::ProductStats;
use depot_core::services::{Principal, ProductOverview};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeStats {
    pub total_products: u64,
    pub in_stock_count: u64,
    pub borrowed_count: u64,
    /// Percentage of active products in stock, rounded; 0 when empty.
    pub availability_rate: u64,
}

impl From<ProductStats> for HomeStats {
    fn from(stats: ProductStats) -> Self {
        let availability_rate = if stats.total == 0 {
            0
        } else {
            (stats.in_stock as f64 / stats.total as f64 * 100.0).round() as u64
        };
        Self {
            total_products: stats.total,
            in_stock_count: stats.in_stock,
            borrowed_count: stats.borrowed,
            availability_rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeData {
    pub user: Principal,
    pub welcome_message: String,
    pub stats: HomeStats,
    pub recent_products: Vec<Product>,
    pub recently_borrowed: Vec<Product>,
}

/// GET /api/home
///
/// Served without the datastore gate: when the store is down the stats are
/// zeroed and a warning is attached.
pub async fn home(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<HomeData>>, ApiError> {
    let overview = if state.datastore.is_available() {
        match state.products.overview().await {
            Ok(overview) => Some(overview),
            Err(DomainError::DatastoreUnavailable) => None,
            Err(e) => return Err(e.into()),
        }
    } else {
        None
    };

    let welcome_message = format!("Welcome, {}!", principal.name);
    let degraded = overview.is_none();
    let ProductOverview {
        stats,
        recent_products,
        recently_borrowed,
    } = overview.unwrap_or_else(|| ProductOverview {
        stats: ProductStats::default(),
        recent_products: Vec::new(),
        recently_borrowed: Vec::new(),
    });

    let response = ApiResponse::success(HomeData {
        user: principal,
        welcome_message: welcome_message.clone(),
        stats: stats.into(),
        recent_products,
        recently_borrowed,
    })
    .with_message(welcome_message);

    if degraded {
        Ok(Json(response.with_warning("Database unavailable, statistics are not up to date")))
    } else {
        Ok(Json(response))
    }
}
