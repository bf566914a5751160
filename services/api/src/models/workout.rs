//! Workout domain models
//!
//! A workout starts out `PENDING` and moves to `COMPLETED` exactly once,
//! through the complete operation. The generic update path has no access to
//! the status field.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Lifecycle state of a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutStatus {
    Pending,
    Completed,
}

impl WorkoutStatus {
    /// Wire and storage representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutStatus::Pending => "PENDING",
            WorkoutStatus::Completed => "COMPLETED",
        }
    }

    /// Parse a status from its storage representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(WorkoutStatus::Pending),
            "COMPLETED" => Some(WorkoutStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workout entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub status: WorkoutStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment of a catalog exercise to a workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
    pub order_index: i32,
}

/// Immutable record of a completed performance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub performed_at: DateTime<Utc>,
    pub total_duration: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Workout hydrated with its exercise assignments
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutWithExercises {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<WorkoutExercise>,
}

/// Workout with its performance logs attached, used by reporting
#[derive(Debug, Clone)]
pub struct WorkoutWithLogs {
    pub workout: Workout,
    pub logs: Vec<WorkoutLog>,
}

/// Fields for a new workout row
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub user_id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}

/// Fields for a new workout log row
#[derive(Debug, Clone)]
pub struct NewWorkoutLog {
    pub performed_at: DateTime<Utc>,
    pub total_duration: f64,
    pub notes: Option<String>,
}

/// Validated partial update, applied by the persistence layer
///
/// `notes` is doubly optional: the outer level records whether the field was
/// supplied at all, the inner level whether it was set to a value or cleared.
#[derive(Debug, Clone, Default)]
pub struct WorkoutChanges {
    pub title: Option<String>,
    pub notes: Option<Option<String>>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl WorkoutChanges {
    /// True when no field is present, i.e. the update is a no-op
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.notes.is_none() && self.scheduled_at.is_none()
    }
}

/// One exercise entry in a create request
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseAssignment {
    pub exercise_id: Uuid,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
    #[serde(default)]
    pub order_index: Option<i32>,
}

/// Request to create a workout
///
/// `title` and `scheduled_at` are optional at the wire level so that missing
/// values surface as field-level validation errors instead of body rejections.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkoutRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseAssignment>,
}

/// Request to partially update a workout
///
/// Unknown keys are rejected, which keeps `status` out of reach of the
/// generic update path; status only ever changes through completion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateWorkoutRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub scheduled_at: Option<String>,
}

/// Request to complete a workout
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteWorkoutRequest {
    pub total_duration: Option<f64>,
    pub performed_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Distinguishes an absent field from an explicit null
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Parse a client-supplied timestamp, accepting RFC 3339 or a plain
/// `YYYY-MM-DD` date (interpreted as midnight UTC)
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
