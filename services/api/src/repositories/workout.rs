//! Workout persistence port and its PostgreSQL implementation
//!
//! `WorkoutStore` is the seam between the lifecycle/reporting services and
//! the relational store. Every lookup that feeds a lifecycle operation is
//! filtered by `(id, user_id)` so that records owned by another user are
//! indistinguishable from absent ones. Multi-step writes (cascade delete,
//! complete) run inside a single transaction.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::workout::{
    ExerciseAssignment, NewWorkout, NewWorkoutLog, Workout, WorkoutChanges, WorkoutExercise,
    WorkoutLog, WorkoutStatus, WorkoutWithExercises, WorkoutWithLogs,
};

/// Abstract persistence port for workouts and their child records
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Find a workout by id, scoped to its owner
    async fn find_workout(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Workout>>;

    /// Find a workout with its exercise assignments, scoped to its owner
    async fn workout_with_exercises(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<WorkoutWithExercises>>;

    /// List an owner's workouts, optionally filtered by status, ordered
    /// ascending by scheduled time, each with its exercise assignments
    async fn list_workouts(
        &self,
        owner_id: Uuid,
        status: Option<WorkoutStatus>,
    ) -> Result<Vec<WorkoutWithExercises>>;

    /// Insert a new workout in the pending state
    async fn create_workout(&self, fields: &NewWorkout) -> Result<Workout>;

    /// Insert one exercise assignment for a workout
    async fn create_workout_exercise(
        &self,
        workout_id: Uuid,
        assignment: &ExerciseAssignment,
    ) -> Result<WorkoutExercise>;

    /// Apply a non-empty partial update and return the updated row
    async fn update_workout(&self, id: Uuid, changes: &WorkoutChanges) -> Result<Workout>;

    /// Remove a workout and its child records: exercise assignments first,
    /// then logs, then the workout itself, atomically
    async fn delete_workout(&self, id: Uuid) -> Result<()>;

    /// Mark a workout completed and insert its performance log, atomically
    async fn complete_workout(&self, id: Uuid, log: &NewWorkoutLog) -> Result<WorkoutLog>;

    /// Completed workouts for an owner with all their logs attached; when a
    /// range is given, only workouts with at least one log inside it qualify
    async fn completed_workouts_with_logs(
        &self,
        owner_id: Uuid,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<WorkoutWithLogs>>;
}

/// PostgreSQL-backed workout store
#[derive(Clone)]
pub struct PgWorkoutStore {
    pool: PgPool,
}

const WORKOUT_COLUMNS: &str =
    "id, user_id, title, notes, scheduled_at, status, created_at, updated_at";

impl PgWorkoutStore {
    /// Create a new workout store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_workout(row: &PgRow) -> Result<Workout> {
        let status: String = row.get("status");
        let status = WorkoutStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("Unknown workout status in store: {}", status))?;

        Ok(Workout {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            notes: row.get("notes"),
            scheduled_at: row.get("scheduled_at"),
            status,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    fn map_exercise(row: &PgRow) -> WorkoutExercise {
        WorkoutExercise {
            id: row.get("id"),
            workout_id: row.get("workout_id"),
            exercise_id: row.get("exercise_id"),
            sets: row.get("sets"),
            reps: row.get("reps"),
            weight: row.get("weight"),
            order_index: row.get("order_index"),
        }
    }

    fn map_log(row: &PgRow) -> WorkoutLog {
        WorkoutLog {
            id: row.get("id"),
            workout_id: row.get("workout_id"),
            performed_at: row.get("performed_at"),
            total_duration: row.get("total_duration"),
            notes: row.get("notes"),
            created_at: row.get("created_at"),
        }
    }

    /// Exercise assignments for a set of workouts, grouped by workout id
    async fn exercises_by_workout(
        &self,
        workout_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<WorkoutExercise>>> {
        if workout_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, workout_id, exercise_id, sets, reps, weight, order_index
            FROM workout_exercises
            WHERE workout_id = ANY($1)
            ORDER BY order_index ASC
            "#,
        )
        .bind(workout_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<WorkoutExercise>> = HashMap::new();
        for row in &rows {
            let exercise = Self::map_exercise(row);
            grouped.entry(exercise.workout_id).or_default().push(exercise);
        }

        Ok(grouped)
    }
}

#[async_trait]
impl WorkoutStore for PgWorkoutStore {
    async fn find_workout(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Workout>> {
        let row = sqlx::query(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_workout).transpose()
    }

    async fn workout_with_exercises(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<WorkoutWithExercises>> {
        let Some(workout) = self.find_workout(id, owner_id).await? else {
            return Ok(None);
        };

        let mut grouped = self.exercises_by_workout(&[workout.id]).await?;
        let exercises = grouped.remove(&workout.id).unwrap_or_default();

        Ok(Some(WorkoutWithExercises { workout, exercises }))
    }

    async fn list_workouts(
        &self,
        owner_id: Uuid,
        status: Option<WorkoutStatus>,
    ) -> Result<Vec<WorkoutWithExercises>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {WORKOUT_COLUMNS} FROM workouts \
                     WHERE user_id = $1 AND status = $2 \
                     ORDER BY scheduled_at ASC"
                ))
                .bind(owner_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {WORKOUT_COLUMNS} FROM workouts \
                     WHERE user_id = $1 \
                     ORDER BY scheduled_at ASC"
                ))
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let workouts = rows
            .iter()
            .map(Self::map_workout)
            .collect::<Result<Vec<_>>>()?;

        let ids: Vec<Uuid> = workouts.iter().map(|w| w.id).collect();
        let mut grouped = self.exercises_by_workout(&ids).await?;

        Ok(workouts
            .into_iter()
            .map(|workout| {
                let exercises = grouped.remove(&workout.id).unwrap_or_default();
                WorkoutWithExercises { workout, exercises }
            })
            .collect())
    }

    async fn create_workout(&self, fields: &NewWorkout) -> Result<Workout> {
        let row = sqlx::query(&format!(
            "INSERT INTO workouts (user_id, title, notes, scheduled_at, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {WORKOUT_COLUMNS}"
        ))
        .bind(fields.user_id)
        .bind(&fields.title)
        .bind(&fields.notes)
        .bind(fields.scheduled_at)
        .bind(WorkoutStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Self::map_workout(&row)
    }

    async fn create_workout_exercise(
        &self,
        workout_id: Uuid,
        assignment: &ExerciseAssignment,
    ) -> Result<WorkoutExercise> {
        let row = sqlx::query(
            r#"
            INSERT INTO workout_exercises (workout_id, exercise_id, sets, reps, weight, order_index)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, workout_id, exercise_id, sets, reps, weight, order_index
            "#,
        )
        .bind(workout_id)
        .bind(assignment.exercise_id)
        .bind(assignment.sets)
        .bind(assignment.reps)
        .bind(assignment.weight)
        .bind(assignment.order_index.unwrap_or(1))
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::map_exercise(&row))
    }

    async fn update_workout(&self, id: Uuid, changes: &WorkoutChanges) -> Result<Workout> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE workouts SET ");
        let mut fields = builder.separated(", ");

        if let Some(title) = &changes.title {
            fields.push("title = ").push_bind_unseparated(title);
        }
        if let Some(notes) = &changes.notes {
            fields.push("notes = ").push_bind_unseparated(notes.clone());
        }
        if let Some(scheduled_at) = changes.scheduled_at {
            fields
                .push("scheduled_at = ")
                .push_bind_unseparated(scheduled_at);
        }
        fields.push("updated_at = now()");

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {WORKOUT_COLUMNS}"));

        let row = builder.build().fetch_one(&self.pool).await?;
        Self::map_workout(&row)
    }

    async fn delete_workout(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Child rows first to satisfy referential integrity
        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM workout_logs WHERE workout_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn complete_workout(&self, id: Uuid, log: &NewWorkoutLog) -> Result<WorkoutLog> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE workouts SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(WorkoutStatus::Completed.as_str())
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"
            INSERT INTO workout_logs (workout_id, performed_at, total_duration, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, workout_id, performed_at, total_duration, notes, created_at
            "#,
        )
        .bind(id)
        .bind(log.performed_at)
        .bind(log.total_duration)
        .bind(&log.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Self::map_log(&row))
    }

    async fn completed_workouts_with_logs(
        &self,
        owner_id: Uuid,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<WorkoutWithLogs>> {
        let rows = match range {
            Some((from, to)) => {
                sqlx::query(&format!(
                    "SELECT {WORKOUT_COLUMNS} FROM workouts \
                     WHERE user_id = $1 AND status = $2 \
                       AND EXISTS (SELECT 1 FROM workout_logs \
                                   WHERE workout_id = workouts.id \
                                     AND performed_at >= $3 AND performed_at <= $4) \
                     ORDER BY scheduled_at ASC"
                ))
                .bind(owner_id)
                .bind(WorkoutStatus::Completed.as_str())
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {WORKOUT_COLUMNS} FROM workouts \
                     WHERE user_id = $1 AND status = $2 \
                     ORDER BY scheduled_at ASC"
                ))
                .bind(owner_id)
                .bind(WorkoutStatus::Completed.as_str())
                .fetch_all(&self.pool)
                .await?
            }
        };

        let workouts = rows
            .iter()
            .map(Self::map_workout)
            .collect::<Result<Vec<_>>>()?;

        let ids: Vec<Uuid> = workouts.iter().map(|w| w.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // All logs of each qualifying workout, not only those inside the range
        let log_rows = sqlx::query(
            r#"
            SELECT id, workout_id, performed_at, total_duration, notes, created_at
            FROM workout_logs
            WHERE workout_id = ANY($1)
            ORDER BY performed_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<WorkoutLog>> = HashMap::new();
        for row in &log_rows {
            let log = Self::map_log(row);
            grouped.entry(log.workout_id).or_default().push(log);
        }

        Ok(workouts
            .into_iter()
            .map(|workout| {
                let logs = grouped.remove(&workout.id).unwrap_or_default();
                WorkoutWithLogs { workout, logs }
            })
            .collect())
    }
}
