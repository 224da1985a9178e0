// ============================================================================
// Depot API - Router
// File: crates/depot-api/src/router.rs
// ============================================================================

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, map_response},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

use crate::error::{expose_error_detail, ApiError};
use crate::handlers::{admin, auth, health, home, locations, products};
use crate::middleware::{require_admin, require_auth, require_datastore};
use crate::state::AppState;

const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    // No gates
    let public_routes = Router::new()
        .route("/", get(health::health_check))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/auth/logout", post(auth::logout));

    // Datastore only
    let open_data_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/products/stats", get(products::stats))
        .route("/api/products/locations", get(products::locations))
        .route_layer(from_fn_with_state(state.clone(), require_datastore));

    // Token only; these degrade instead of failing while the store is down
    let degraded_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/home", get(home::home))
        .route("/api/admin/sync-db", post(admin::sync_db))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let member_routes = Router::new()
        .route("/api/auth/users", get(auth::active_users))
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/barcode/{barcode}", get(products::get_by_barcode))
        .route(
            "/api/products/{id}",
            get(products::get).put(products::update).delete(products::delete),
        )
        .route("/api/products/{id}/borrow", post(products::borrow))
        .route("/api/products/{id}/return", post(products::return_product))
        .route("/api/locations", get(locations::list))
        .route("/api/locations/{id}", get(locations::get))
        .route_layer(from_fn_with_state(state.clone(), require_datastore))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/api/locations", post(locations::create))
        .route(
            "/api/locations/{id}",
            put(locations::update).delete(locations::delete),
        )
        .route("/api/locations/{id}/toggle", patch(locations::toggle))
        .route("/api/admin/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/api/admin/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/api/admin/users/{id}/toggle-status", patch(admin::toggle_user_status))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/backup", post(admin::backup))
        .route_layer(from_fn_with_state(state.clone(), require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_datastore))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let router = Router::new()
        .merge(public_routes)
        .merge(open_data_routes)
        .merge(degraded_routes)
        .merge(member_routes)
        .merge(admin_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.storage.uploads_dir))
        .fallback(route_not_found);

    let router = if state.config.app.is_production() {
        router
    } else {
        router.layer(map_response(expose_error_detail))
    };

    router
        .layer(cors_layer(&state.config.app.cors_origins))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}
