//! Identity service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, models::NewUser, validation};

/// Request for user signup
#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user, without the credential hash
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// Response for signup and login
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Create the router for the identity service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/auth/signup", post(signup))
        .route("/api/v1/auth/login", post(login))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User signup endpoint
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Signup attempt for email: {}", payload.email);

    validation::validate_email(&payload.email).map_err(AuthError::BadRequest)?;
    validation::validate_username(&payload.username).map_err(AuthError::BadRequest)?;
    validation::validate_password(&payload.password).map_err(AuthError::BadRequest)?;

    let existing = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?;

    if existing.is_some() {
        return Err(AuthError::Conflict("Email already in use".to_string()));
    }

    let new_user = NewUser {
        username: payload.username,
        email: payload.email,
        password: payload.password,
    };

    let user = state.user_repository.create(&new_user).await.map_err(|e| {
        error!("Failed to create user: {}", e);
        AuthError::InternalServerError
    })?;

    let token = state.jwt_service.generate_token(&user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        AuthError::InternalServerError
    })?;

    let response = TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.token_expiry(),
        user: UserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
///
/// Unknown email and wrong password produce the same response so callers
/// cannot probe which emails are registered.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for email: {}", payload.email);

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    let password_matches = state
        .user_repository
        .verify_password(&user, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            AuthError::InternalServerError
        })?;

    if !password_matches {
        return Err(AuthError::Unauthorized);
    }

    let token = state.jwt_service.generate_token(&user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        AuthError::InternalServerError
    })?;

    let response = TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.token_expiry(),
        user: UserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Custom error type for authentication errors
#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    BadRequest(String),
    Conflict(String),
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
