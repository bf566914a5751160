use anyhow::Result;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod middleware;
mod models;
mod reports;
mod repositories;
mod routes;
mod state;
mod workouts;

use common::database::{DatabaseConfig, health_check, init_pool};

use crate::{
    middleware::JwtVerifier,
    reports::ReportService,
    repositories::{ExerciseRepository, PgWorkoutStore},
    state::AppState,
    workouts::WorkoutLifecycle,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply pending migrations
    sqlx::migrate!().run(&pool).await?;

    info!("API service initialized successfully");

    // Wire the persistence port into the core services
    let store = Arc::new(PgWorkoutStore::new(pool.clone()));
    let workouts = WorkoutLifecycle::new(store.clone());
    let reports = ReportService::new(store);
    let exercise_repository = ExerciseRepository::new(pool.clone());

    let jwt_verifier = JwtVerifier::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let app_state = AppState {
        db_pool: pool,
        jwt_verifier,
        workouts,
        reports,
        exercise_repository,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
    info!("API service listening on 0.0.0.0:3001");

    axum::serve(listener, app).await?;

    Ok(())
}
