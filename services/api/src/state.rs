//! Application state shared across handlers

use sqlx::PgPool;

use crate::{
    middleware::JwtVerifier, reports::ReportService, repositories::ExerciseRepository,
    workouts::WorkoutLifecycle,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_verifier: JwtVerifier,
    pub workouts: WorkoutLifecycle,
    pub reports: ReportService,
    pub exercise_repository: ExerciseRepository,
}
