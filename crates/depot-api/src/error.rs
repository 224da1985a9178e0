//! HTTP error mapping
//!
//! Every failure leaves a handler as an [`ApiError`] and is rendered as
//! `{success: false, message, error?, timestamp}`. Internal failures never
//! put their detail in the body; the detail travels in an [`ErrorDetail`]
//! response extension that [`expose_error_detail`] copies into `error` when
//! the server runs outside production.

use axum::{
    body::{to_bytes, Body},
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use depot_core::error::DomainError;
use depot_shared::constants::DATABASE_UNAVAILABLE_CODE;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Detail of an internal failure, kept out of the body by default.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: String,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError(_)
            | DomainError::AlreadyBorrowed
            | DomainError::AlreadyInStock
            | DomainError::BorrowerNotFound
            | DomainError::BarcodeAlreadyExists(_)
            | DomainError::EmailAlreadyExists(_)
            | DomainError::LocationNameAlreadyExists(_)
            | DomainError::SelfModificationForbidden(_) => ApiError::BadRequest(bad_request_message(err)),

            DomainError::ProductNotFound
            | DomainError::BarcodeNotFound
            | DomainError::UserNotFound
            | DomainError::LocationNotFound => ApiError::NotFound(err.to_string()),

            DomainError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            DomainError::Unauthenticated(msg) => ApiError::Unauthorized(msg),
            DomainError::Forbidden => ApiError::Forbidden("Admin privileges required".to_string()),
            DomainError::DatastoreUnavailable => ApiError::ServiceUnavailable,

            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

fn bad_request_message(err: DomainError) -> String {
    match err {
        DomainError::ValidationError(msg) | DomainError::SelfModificationForbidden(msg) => msg,
        other => other.to_string(),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error, detail) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg, None, None)
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, msg, None, None)
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, msg, None, None)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None, None),
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database connection unavailable, please try again later".to_string(),
                Some(DATABASE_UNAVAILABLE_CODE.to_string()),
                None,
            ),
            ApiError::InternalError(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                    Some(detail),
                )
            }
        };

        let body = Json(ErrorBody {
            success: false,
            message,
            error,
            timestamp: Utc::now().to_rfc3339(),
        });

        let mut response = (status, body).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

/// Response mapper installed outside production: writes the hidden
/// [`ErrorDetail`] into the body's `error` field.
pub async fn expose_error_detail(response: Response) -> Response {
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };
    let mut value: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };
    value["error"] = serde_json::Value::String(detail);

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(value.to_string()))
}
