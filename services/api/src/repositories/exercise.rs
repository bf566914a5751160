//! Exercise catalog repository

use anyhow::Result;
use sqlx::{PgPool, Row};

use crate::models::exercise::Exercise;

/// Read-only repository over the exercise catalog
#[derive(Clone)]
pub struct ExerciseRepository {
    pool: PgPool,
}

impl ExerciseRepository {
    /// Create a new exercise repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the full catalog, ordered by name
    pub async fn list_all(&self) -> Result<Vec<Exercise>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, category
            FROM exercises
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let exercises = rows
            .into_iter()
            .map(|row| Exercise {
                id: row.get("id"),
                name: row.get("name"),
                description: row.get("description"),
                category: row.get("category"),
            })
            .collect();

        Ok(exercises)
    }
}
