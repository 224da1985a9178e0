use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    success: bool,
    message: String,
    status: &'static str,
    version: &'static str,
    environment: String,
    database: &'static str,
    timestamp: String,
}

fn banner(state: &AppState) -> HealthResponse {
    HealthResponse {
        success: true,
        message: format!("{} is running", state.config.app.name),
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app.env.clone(),
        database: state.datastore.status_label(),
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// GET / and GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(banner(&state))
}

/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut body = banner(&state);
    if state.datastore.is_available() {
        (StatusCode::OK, Json(body))
    } else {
        body.status = "degraded";
        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}
