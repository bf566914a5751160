//! API service routes
//!
//! Thin transport adapter: handlers parse the request, delegate to the
//! lifecycle manager or report service, and map typed outcomes to status
//! codes. No domain decisions are made here.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, auth_middleware},
    models::workout::{CompleteWorkoutRequest, CreateWorkoutRequest, UpdateWorkoutRequest},
    state::AppState,
};

/// Query parameters for workout listing
#[derive(Debug, Deserialize)]
pub struct ListWorkoutsQuery {
    pub status: Option<String>,
}

/// Query parameters for the summary report
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/workouts", get(list_workouts).post(create_workout))
        .route("/workouts/:id", patch(update_workout).delete(delete_workout))
        .route("/workouts/:id/complete", post(complete_workout))
        .route("/reports/summary", get(workout_summary))
        .route("/exercises", get(list_exercises))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
        .nest("/api/v1", protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Database health check endpoint, reporting the registered user count
pub async fn db_health_check(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db_pool)
        .await
        .map_err(|e| {
            error!("Database health check failed: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(json!({
        "status": "ok",
        "users": users,
    })))
}

/// List the authenticated user's workouts
pub async fn list_workouts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListWorkoutsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let workouts = state
        .workouts
        .list(user.id, query.status.as_deref())
        .await?;

    Ok(Json(workouts))
}

/// Create a new workout with its exercise assignments
pub async fn create_workout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateWorkoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let workout = state.workouts.create(user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(workout)))
}

/// Partially update a workout
pub async fn update_workout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let workout = state.workouts.update(user.id, id, payload).await?;

    Ok(Json(workout))
}

/// Delete a workout and its child records
pub async fn delete_workout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.workouts.delete(user.id, id).await?;

    Ok(Json(json!({"message": "Workout deleted successfully"})))
}

/// Complete a workout, recording its performance log
pub async fn complete_workout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteWorkoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let log = state.workouts.complete(user.id, id, payload).await?;

    Ok(Json(log))
}

/// Summarize completed workouts over an optional date range
pub async fn workout_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .reports
        .summarize(user.id, query.from, query.to)
        .await?;

    Ok(Json(summary))
}

/// List the exercise catalog
pub async fn list_exercises(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let exercises = state.exercise_repository.list_all().await.map_err(|e| {
        error!("Failed to list exercises: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(exercises))
}
