//! Reporting aggregator over completed workouts
//!
//! Read-only. The date range is an existential filter over a workout's
//! logs, while the duration sum covers all logs of each qualifying workout,
//! including logs outside the range. That asymmetry ("any activity in range
//! counts the whole session") is the documented product behavior.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::error::WorkoutError;
use crate::models::workout::parse_timestamp;
use crate::repositories::WorkoutStore;

/// Aggregate summary over an owner's completed workouts
#[derive(Debug, Serialize)]
pub struct WorkoutSummary {
    pub total_completed: u64,
    pub total_duration: f64,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Reporting service over an injected persistence port
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn WorkoutStore>,
}

impl ReportService {
    /// Create a new report service
    pub fn new(store: Arc<dyn WorkoutStore>) -> Self {
        Self { store }
    }

    /// Summarize completed workouts, restricted to `[from, to]` when both
    /// bounds are supplied
    pub async fn summarize(
        &self,
        owner: Uuid,
        from: Option<String>,
        to: Option<String>,
    ) -> Result<WorkoutSummary, WorkoutError> {
        let range = match (from.as_deref(), to.as_deref()) {
            (Some(from), Some(to)) => Some((
                parse_timestamp(from).ok_or(WorkoutError::Validation("from"))?,
                parse_timestamp(to).ok_or(WorkoutError::Validation("to"))?,
            )),
            // A single bound does not restrict anything; both are required
            _ => None,
        };

        let workouts = self.store.completed_workouts_with_logs(owner, range).await?;

        let total_completed = workouts.len() as u64;
        let total_duration = workouts
            .iter()
            .flat_map(|w| &w.logs)
            .map(|log| log.total_duration)
            .sum();

        Ok(WorkoutSummary {
            total_completed,
            total_duration,
            from,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workout::{NewWorkout, NewWorkoutLog};
    use crate::repositories::workout::memory::MemoryWorkoutStore;

    async fn completed_workout_with_logs(
        store: &MemoryWorkoutStore,
        owner: Uuid,
        title: &str,
        logs: &[(&str, f64)],
    ) -> Uuid {
        let workout = store
            .create_workout(&NewWorkout {
                user_id: owner,
                title: title.to_string(),
                notes: None,
                scheduled_at: parse_timestamp("2025-06-01T08:00:00Z").unwrap(),
            })
            .await
            .unwrap();

        for (performed_at, total_duration) in logs {
            store
                .complete_workout(
                    workout.id,
                    &NewWorkoutLog {
                        performed_at: parse_timestamp(performed_at).unwrap(),
                        total_duration: *total_duration,
                        notes: None,
                    },
                )
                .await
                .unwrap();
        }

        workout.id
    }

    #[tokio::test]
    async fn range_filter_is_existential_but_sum_covers_all_logs() {
        let store = Arc::new(MemoryWorkoutStore::new());
        let owner = Uuid::new_v4();

        // Workout A: logs totaling 50, both inside the range
        completed_workout_with_logs(
            &store,
            owner,
            "A",
            &[("2025-06-10T08:00:00Z", 20.0), ("2025-06-20T08:00:00Z", 30.0)],
        )
        .await;

        // Workout B: one log outside the range, one inside; it qualifies and
        // contributes the durations of both logs
        completed_workout_with_logs(
            &store,
            owner,
            "B",
            &[("2025-01-05T08:00:00Z", 15.0), ("2025-06-15T08:00:00Z", 10.0)],
        )
        .await;

        // Workout C: only activity outside the range, excluded entirely
        completed_workout_with_logs(&store, owner, "C", &[("2025-02-01T08:00:00Z", 99.0)]).await;

        let reports = ReportService::new(store);
        let summary = reports
            .summarize(
                owner,
                Some("2025-06-01".to_string()),
                Some("2025-06-30".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(summary.total_completed, 2);
        assert_eq!(summary.total_duration, 75.0);
        assert_eq!(summary.from.as_deref(), Some("2025-06-01"));
        assert_eq!(summary.to.as_deref(), Some("2025-06-30"));
    }

    #[tokio::test]
    async fn without_range_all_completed_workouts_are_summarized() {
        let store = Arc::new(MemoryWorkoutStore::new());
        let owner = Uuid::new_v4();

        completed_workout_with_logs(&store, owner, "A", &[("2025-06-10T08:00:00Z", 20.0)]).await;
        completed_workout_with_logs(&store, owner, "B", &[("2024-01-01T08:00:00Z", 40.0)]).await;

        // A pending workout contributes nothing
        store
            .create_workout(&NewWorkout {
                user_id: owner,
                title: "Planned".to_string(),
                notes: None,
                scheduled_at: parse_timestamp("2025-07-01").unwrap(),
            })
            .await
            .unwrap();

        let reports = ReportService::new(store);
        let summary = reports.summarize(owner, None, None).await.unwrap();

        assert_eq!(summary.total_completed, 2);
        assert_eq!(summary.total_duration, 60.0);
        assert_eq!(summary.from, None);
        assert_eq!(summary.to, None);
    }

    #[tokio::test]
    async fn single_bound_does_not_restrict() {
        let store = Arc::new(MemoryWorkoutStore::new());
        let owner = Uuid::new_v4();

        completed_workout_with_logs(&store, owner, "A", &[("2024-01-01T08:00:00Z", 40.0)]).await;

        let reports = ReportService::new(store);
        let summary = reports
            .summarize(owner, Some("2025-06-01".to_string()), None)
            .await
            .unwrap();

        assert_eq!(summary.total_completed, 1);
        assert_eq!(summary.total_duration, 40.0);
    }

    #[tokio::test]
    async fn unparseable_bounds_are_rejected() {
        let store = Arc::new(MemoryWorkoutStore::new());
        let reports = ReportService::new(store);
        let owner = Uuid::new_v4();

        let err = reports
            .summarize(owner, Some("junk".to_string()), Some("2025-06-30".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkoutError::Validation("from")));

        let err = reports
            .summarize(owner, Some("2025-06-01".to_string()), Some("junk".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkoutError::Validation("to")));
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = Arc::new(MemoryWorkoutStore::new());
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        completed_workout_with_logs(&store, owner, "A", &[("2025-06-10T08:00:00Z", 20.0)]).await;

        let reports = ReportService::new(store);
        let summary = reports.summarize(stranger, None, None).await.unwrap();

        assert_eq!(summary.total_completed, 0);
        assert_eq!(summary.total_duration, 0.0);
    }
}
