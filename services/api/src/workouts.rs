//! Workout lifecycle manager
//!
//! Owns the workout state machine and child-record consistency. Every
//! operation takes the authenticated owner first and resolves the target by
//! `(id, owner)`; a workout owned by someone else is `NotFound`. The only
//! path from `PENDING` to `COMPLETED` is [`WorkoutLifecycle::complete`].

use std::sync::Arc;

use uuid::Uuid;

use crate::error::WorkoutError;
use crate::models::workout::{
    CompleteWorkoutRequest, CreateWorkoutRequest, NewWorkout, NewWorkoutLog, UpdateWorkoutRequest,
    Workout, WorkoutChanges, WorkoutLog, WorkoutStatus, WorkoutWithExercises, parse_timestamp,
};
use crate::repositories::WorkoutStore;

/// Workout lifecycle manager over an injected persistence port
#[derive(Clone)]
pub struct WorkoutLifecycle {
    store: Arc<dyn WorkoutStore>,
}

impl WorkoutLifecycle {
    /// Create a new lifecycle manager
    pub fn new(store: Arc<dyn WorkoutStore>) -> Self {
        Self { store }
    }

    /// List the owner's workouts, optionally filtered by exact status,
    /// ordered ascending by scheduled time
    pub async fn list(
        &self,
        owner: Uuid,
        status_filter: Option<&str>,
    ) -> Result<Vec<WorkoutWithExercises>, WorkoutError> {
        let status = match status_filter {
            Some(value) => {
                Some(WorkoutStatus::parse(value).ok_or(WorkoutError::Validation("status"))?)
            }
            None => None,
        };

        Ok(self.store.list_workouts(owner, status).await?)
    }

    /// Create a pending workout with its exercise assignments and return it
    /// hydrated, re-read from the store
    pub async fn create(
        &self,
        owner: Uuid,
        request: CreateWorkoutRequest,
    ) -> Result<WorkoutWithExercises, WorkoutError> {
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(WorkoutError::Validation("title"))?
            .to_string();

        let scheduled_at = request
            .scheduled_at
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or(WorkoutError::Validation("scheduled_at"))?;

        let workout = self
            .store
            .create_workout(&NewWorkout {
                user_id: owner,
                title,
                notes: request.notes,
                scheduled_at,
            })
            .await?;

        for assignment in &request.exercises {
            self.store
                .create_workout_exercise(workout.id, assignment)
                .await?;
        }

        self.store
            .workout_with_exercises(workout.id, owner)
            .await?
            .ok_or_else(|| {
                WorkoutError::Fatal(anyhow::anyhow!(
                    "Workout {} missing immediately after creation",
                    workout.id
                ))
            })
    }

    /// Apply a partial update; fields absent from the request stay untouched.
    /// An empty change set returns the current record without issuing a write.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateWorkoutRequest,
    ) -> Result<Workout, WorkoutError> {
        let existing = self
            .store
            .find_workout(id, owner)
            .await?
            .ok_or(WorkoutError::NotFound)?;

        let mut changes = WorkoutChanges::default();

        if let Some(title) = request.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(WorkoutError::Validation("title"));
            }
            changes.title = Some(title);
        }

        if let Some(value) = request.scheduled_at.as_deref() {
            changes.scheduled_at =
                Some(parse_timestamp(value).ok_or(WorkoutError::Validation("scheduled_at"))?);
        }

        changes.notes = request.notes;

        if changes.is_empty() {
            return Ok(existing);
        }

        Ok(self.store.update_workout(id, &changes).await?)
    }

    /// Delete a workout and all of its child records
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), WorkoutError> {
        self.store
            .find_workout(id, owner)
            .await?
            .ok_or(WorkoutError::NotFound)?;

        Ok(self.store.delete_workout(id).await?)
    }

    /// Complete a pending workout, recording exactly one performance log.
    /// Completing an already completed workout is rejected.
    pub async fn complete(
        &self,
        owner: Uuid,
        id: Uuid,
        request: CompleteWorkoutRequest,
    ) -> Result<WorkoutLog, WorkoutError> {
        let workout = self
            .store
            .find_workout(id, owner)
            .await?
            .ok_or(WorkoutError::NotFound)?;

        let total_duration = request
            .total_duration
            .ok_or(WorkoutError::Validation("total_duration"))?;

        if workout.status == WorkoutStatus::Completed {
            return Err(WorkoutError::AlreadyCompleted);
        }

        let performed_at = match request.performed_at.as_deref() {
            Some(value) => parse_timestamp(value).ok_or(WorkoutError::Validation("performed_at"))?,
            None => chrono::Utc::now(),
        };

        let log = self
            .store
            .complete_workout(
                id,
                &NewWorkoutLog {
                    performed_at,
                    total_duration,
                    notes: request.notes,
                },
            )
            .await?;

        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workout::ExerciseAssignment;
    use crate::repositories::workout::memory::MemoryWorkoutStore;

    fn lifecycle() -> (WorkoutLifecycle, Arc<MemoryWorkoutStore>) {
        let store = Arc::new(MemoryWorkoutStore::new());
        (WorkoutLifecycle::new(store.clone()), store)
    }

    fn assignment(sets: i32, reps: i32, weight: f64, order_index: Option<i32>) -> ExerciseAssignment {
        ExerciseAssignment {
            exercise_id: Uuid::new_v4(),
            sets,
            reps,
            weight,
            order_index,
        }
    }

    fn create_request(title: &str, exercises: Vec<ExerciseAssignment>) -> CreateWorkoutRequest {
        CreateWorkoutRequest {
            title: Some(title.to_string()),
            notes: Some("focus chest".to_string()),
            scheduled_at: Some("2025-11-22T18:00:00Z".to_string()),
            exercises,
        }
    }

    fn complete_request(total_duration: Option<f64>) -> CompleteWorkoutRequest {
        CompleteWorkoutRequest {
            total_duration,
            performed_at: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_then_list_returns_hydrated_workout() {
        let (workouts, _) = lifecycle();
        let owner = Uuid::new_v4();

        let created = workouts
            .create(
                owner,
                create_request(
                    "Push day",
                    vec![assignment(3, 10, 40.0, Some(1)), assignment(4, 8, 60.0, None)],
                ),
            )
            .await
            .unwrap();

        assert_eq!(created.workout.status, WorkoutStatus::Pending);
        assert_eq!(created.exercises.len(), 2);

        let listed = workouts.list(owner, None).await.unwrap();
        assert_eq!(listed.len(), 1);

        let exercises = &listed[0].exercises;
        assert_eq!(exercises.len(), 2);
        assert!(exercises.iter().any(|e| e.sets == 3 && e.reps == 10 && e.weight == 40.0));
        assert!(exercises.iter().any(|e| e.sets == 4 && e.reps == 8 && e.weight == 60.0));
        // Unspecified order_index defaults to 1
        assert!(exercises.iter().all(|e| e.order_index == 1));
    }

    #[tokio::test]
    async fn list_orders_by_scheduled_time_and_filters_by_status() {
        let (workouts, _) = lifecycle();
        let owner = Uuid::new_v4();

        let later = CreateWorkoutRequest {
            scheduled_at: Some("2025-12-01T08:00:00Z".to_string()),
            ..create_request("Later", vec![])
        };
        let earlier = CreateWorkoutRequest {
            scheduled_at: Some("2025-11-01T08:00:00Z".to_string()),
            ..create_request("Earlier", vec![])
        };

        workouts.create(owner, later).await.unwrap();
        let earlier_created = workouts.create(owner, earlier).await.unwrap();

        let listed = workouts.list(owner, None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].workout.title, "Earlier");
        assert_eq!(listed[1].workout.title, "Later");

        workouts
            .complete(owner, earlier_created.workout.id, complete_request(Some(30.0)))
            .await
            .unwrap();

        let completed = workouts.list(owner, Some("COMPLETED")).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].workout.title, "Earlier");

        let pending = workouts.list(owner, Some("PENDING")).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].workout.title, "Later");
    }

    #[tokio::test]
    async fn list_rejects_unknown_status_filter() {
        let (workouts, _) = lifecycle();

        let err = workouts
            .list(Uuid::new_v4(), Some("ARCHIVED"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkoutError::Validation("status")));
    }

    #[tokio::test]
    async fn create_validates_title_and_schedule() {
        let (workouts, _) = lifecycle();
        let owner = Uuid::new_v4();

        let missing_title = CreateWorkoutRequest {
            title: None,
            ..create_request("ignored", vec![])
        };
        assert!(matches!(
            workouts.create(owner, missing_title).await.unwrap_err(),
            WorkoutError::Validation("title")
        ));

        let blank_title = CreateWorkoutRequest {
            title: Some("   ".to_string()),
            ..create_request("ignored", vec![])
        };
        assert!(matches!(
            workouts.create(owner, blank_title).await.unwrap_err(),
            WorkoutError::Validation("title")
        ));

        let bad_schedule = CreateWorkoutRequest {
            scheduled_at: Some("someday".to_string()),
            ..create_request("Push day", vec![])
        };
        assert!(matches!(
            workouts.create(owner, bad_schedule).await.unwrap_err(),
            WorkoutError::Validation("scheduled_at")
        ));

        let missing_schedule = CreateWorkoutRequest {
            scheduled_at: None,
            ..create_request("Push day", vec![])
        };
        assert!(matches!(
            workouts.create(owner, missing_schedule).await.unwrap_err(),
            WorkoutError::Validation("scheduled_at")
        ));
    }

    #[tokio::test]
    async fn operations_on_foreign_workouts_are_not_found() {
        let (workouts, _) = lifecycle();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let created = workouts
            .create(owner, create_request("Push day", vec![assignment(3, 10, 40.0, None)]))
            .await
            .unwrap();
        let id = created.workout.id;

        assert!(workouts.list(stranger, None).await.unwrap().is_empty());

        assert!(matches!(
            workouts
                .update(stranger, id, UpdateWorkoutRequest::default())
                .await
                .unwrap_err(),
            WorkoutError::NotFound
        ));
        assert!(matches!(
            workouts.delete(stranger, id).await.unwrap_err(),
            WorkoutError::NotFound
        ));
        assert!(matches!(
            workouts
                .complete(stranger, id, complete_request(Some(45.0)))
                .await
                .unwrap_err(),
            WorkoutError::NotFound
        ));

        // The record is still intact for its owner
        assert_eq!(workouts.list(owner, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_update_returns_record_without_writing() {
        let (workouts, store) = lifecycle();
        let owner = Uuid::new_v4();

        let created = workouts
            .create(owner, create_request("Push day", vec![]))
            .await
            .unwrap();

        let updated = workouts
            .update(owner, created.workout.id, UpdateWorkoutRequest::default())
            .await
            .unwrap();

        assert_eq!(updated.title, "Push day");
        assert_eq!(updated.notes.as_deref(), Some("focus chest"));
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn partial_update_touches_only_supplied_fields() {
        let (workouts, store) = lifecycle();
        let owner = Uuid::new_v4();

        let created = workouts
            .create(owner, create_request("Push day", vec![]))
            .await
            .unwrap();
        let id = created.workout.id;

        let updated = workouts
            .update(
                owner,
                id,
                UpdateWorkoutRequest {
                    title: Some("Pull day".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Pull day");
        assert_eq!(updated.notes.as_deref(), Some("focus chest"));
        assert_eq!(updated.status, WorkoutStatus::Pending);
        assert_eq!(store.update_calls(), 1);

        // Explicit null clears notes; absence left them alone above
        let cleared = workouts
            .update(
                owner,
                id,
                UpdateWorkoutRequest {
                    notes: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(cleared.title, "Pull day");
        assert_eq!(cleared.notes, None);
    }

    #[tokio::test]
    async fn update_reparses_schedule_and_rejects_garbage() {
        let (workouts, _) = lifecycle();
        let owner = Uuid::new_v4();

        let created = workouts
            .create(owner, create_request("Push day", vec![]))
            .await
            .unwrap();
        let id = created.workout.id;

        let updated = workouts
            .update(
                owner,
                id,
                UpdateWorkoutRequest {
                    scheduled_at: Some("2026-01-05".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.scheduled_at, parse_timestamp("2026-01-05").unwrap());

        let err = workouts
            .update(
                owner,
                id,
                UpdateWorkoutRequest {
                    scheduled_at: Some("tomorrowish".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkoutError::Validation("scheduled_at")));

        let err = workouts
            .update(
                owner,
                id,
                UpdateWorkoutRequest {
                    title: Some("".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkoutError::Validation("title")));
    }

    #[tokio::test]
    async fn complete_transitions_once_and_records_one_log() {
        let (workouts, store) = lifecycle();
        let owner = Uuid::new_v4();

        let created = workouts
            .create(owner, create_request("Push day", vec![]))
            .await
            .unwrap();
        let id = created.workout.id;

        let log = workouts
            .complete(owner, id, complete_request(Some(42.5)))
            .await
            .unwrap();

        assert_eq!(log.workout_id, id);
        assert_eq!(log.total_duration, 42.5);
        assert_eq!(store.log_count(), 1);

        let listed = workouts.list(owner, Some("COMPLETED")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].workout.status, WorkoutStatus::Completed);

        // Re-completion is rejected and must not append a second log
        let err = workouts
            .complete(owner, id, complete_request(Some(10.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkoutError::AlreadyCompleted));
        assert_eq!(store.log_count(), 1);
    }

    #[tokio::test]
    async fn complete_requires_duration_and_honors_performed_at() {
        let (workouts, _) = lifecycle();
        let owner = Uuid::new_v4();

        let created = workouts
            .create(owner, create_request("Push day", vec![]))
            .await
            .unwrap();
        let id = created.workout.id;

        let err = workouts
            .complete(owner, id, complete_request(None))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkoutError::Validation("total_duration")));

        let log = workouts
            .complete(
                owner,
                id,
                CompleteWorkoutRequest {
                    total_duration: Some(60.0),
                    performed_at: Some("2025-11-23T07:30:00Z".to_string()),
                    notes: Some("felt strong".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(log.performed_at, parse_timestamp("2025-11-23T07:30:00Z").unwrap());
        assert_eq!(log.notes.as_deref(), Some("felt strong"));
    }

    #[tokio::test]
    async fn delete_cascades_exercises_and_logs() {
        let (workouts, store) = lifecycle();
        let owner = Uuid::new_v4();

        let created = workouts
            .create(
                owner,
                create_request(
                    "Push day",
                    vec![assignment(3, 10, 40.0, Some(1)), assignment(4, 8, 60.0, Some(2))],
                ),
            )
            .await
            .unwrap();
        let id = created.workout.id;

        workouts
            .complete(owner, id, complete_request(Some(55.0)))
            .await
            .unwrap();

        assert_eq!(store.exercise_count(), 2);
        assert_eq!(store.log_count(), 1);

        workouts.delete(owner, id).await.unwrap();

        assert_eq!(store.exercise_count(), 0);
        assert_eq!(store.log_count(), 0);
        assert!(workouts.list(owner, None).await.unwrap().is_empty());

        assert!(matches!(
            workouts.delete(owner, id).await.unwrap_err(),
            WorkoutError::NotFound
        ));
    }
}
