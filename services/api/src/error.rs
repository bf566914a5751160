//! Error types for the API service
//!
//! `WorkoutError` is the typed outcome of lifecycle and reporting
//! operations; `ApiError` is the transport-level translation of those
//! outcomes into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Typed outcomes for workout lifecycle and reporting operations
///
/// A workout owned by a different principal is reported as `NotFound`, never
/// as a distinct error, so workout ids cannot be enumerated across owners.
#[derive(Error, Debug)]
pub enum WorkoutError {
    /// Entity absent, or owned by a different principal
    #[error("Workout not found")]
    NotFound,

    /// Malformed or missing required field
    #[error("Invalid or missing field: {0}")]
    Validation(&'static str),

    /// Completion requested for an already completed workout
    #[error("Workout is already completed")]
    AlreadyCompleted,

    /// Persistence-layer failure, not recoverable locally
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Unauthorized access
    #[error("Unauthorized")]
    Unauthorized,

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflicting state transition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl From<WorkoutError> for ApiError {
    fn from(err: WorkoutError) -> Self {
        match err {
            WorkoutError::NotFound => ApiError::NotFound("Workout not found".to_string()),
            WorkoutError::Validation(field) => {
                ApiError::BadRequest(format!("Invalid or missing field: {}", field))
            }
            WorkoutError::AlreadyCompleted => {
                ApiError::Conflict("Workout is already completed".to_string())
            }
            WorkoutError::Fatal(e) => {
                tracing::error!("Persistence failure: {:#}", e);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
