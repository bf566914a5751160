//! Seeds the exercise catalog with reference data.
//!
//! Idempotent: existing entries are left untouched.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

const CATALOG: &[(&str, &str, &str)] = &[
    ("Running", "5 KM, morning run", "Cardio"),
    ("Bench Press", "Chest workout with barbell", "Chest"),
    ("Squat", "Barbell back squat", "Legs"),
    ("Deadlift", "Conventional barbell deadlift", "Back"),
    ("Overhead Press", "Standing barbell press", "Shoulders"),
    ("Pull Up", "Bodyweight pull up, overhand grip", "Back"),
];

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    let mut seeded = 0u64;
    for (name, description, category) in CATALOG {
        let result = sqlx::query(
            r#"
            INSERT INTO exercises (name, description, category)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(category)
        .execute(&pool)
        .await?;

        seeded += result.rows_affected();
    }

    info!("Seeded {} exercises ({} in catalog)", seeded, CATALOG.len());

    Ok(())
}
