//! Repository for the `workout_sessions` table (sync drafts).
//!
//! Version checks are folded into the UPDATE statements themselves
//! (compare-and-swap on `sync_version`), never read-then-write: a losing
//! writer simply matches zero rows and the stored draft is untouched.

use chrono::NaiveDate;
use liftlog_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::workout::{CreateWorkout, Workout};
use crate::models::workout_session::{
    CompleteWorkoutSession, SyncWorkoutSession, WorkoutSession,
};
use crate::repositories::WorkoutRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, plan_id, day, session_date, status, exercises, \
                        current_exercise_index, notes, rpe, workout_start_time, \
                        substituted_exercises, sync_version, created_at, updated_at";

/// Sync-engine operations for in-progress workout drafts.
pub struct WorkoutSessionRepo;

impl WorkoutSessionRepo {
    /// Insert a fresh draft at `sync_version = 1` for the scoping key.
    ///
    /// Returns `None` when an in-progress draft already exists for the key
    /// (including one created by a concurrent request); the caller then
    /// falls through to [`Self::update_active`] instead of duplicating.
    pub async fn insert_active(
        pool: &PgPool,
        input: &SyncWorkoutSession,
    ) -> Result<Option<WorkoutSession>, sqlx::Error> {
        let query = format!(
            "INSERT INTO workout_sessions
                 (user_id, plan_id, day, session_date, exercises,
                  current_exercise_index, notes, rpe, workout_start_time,
                  substituted_exercises)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (user_id, plan_id, day, session_date)
                 WHERE status = 'in_progress'
                 DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(input.user_id)
            .bind(&input.plan_id)
            .bind(&input.day)
            .bind(input.session_date)
            .bind(Json(&input.exercises))
            .bind(input.current_exercise_index)
            .bind(&input.notes)
            .bind(input.rpe)
            .bind(input.workout_start_time)
            .bind(Json(&input.substituted_exercises))
            .fetch_optional(pool)
            .await
    }

    /// Apply a sync push to the existing in-progress draft for the scoping
    /// key, incrementing `sync_version`.
    ///
    /// With `expected_version = Some(n)` this is a compare-and-swap: the
    /// update only matches when the stored version is still `n`. With
    /// `None` it is a blind last-write-wins overwrite. Either way `None`
    /// out means no row matched -- stale version or no active draft.
    pub async fn update_active(
        pool: &PgPool,
        input: &SyncWorkoutSession,
        expected_version: Option<i64>,
    ) -> Result<Option<WorkoutSession>, sqlx::Error> {
        let query = format!(
            "UPDATE workout_sessions
             SET exercises = $5,
                 current_exercise_index = $6,
                 notes = $7,
                 rpe = $8,
                 workout_start_time = $9,
                 substituted_exercises = $10,
                 sync_version = sync_version + 1,
                 updated_at = NOW()
             WHERE user_id = $1
               AND plan_id = $2
               AND day = $3
               AND session_date = $4
               AND status = 'in_progress'
               AND ($11::BIGINT IS NULL OR sync_version = $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(input.user_id)
            .bind(&input.plan_id)
            .bind(&input.day)
            .bind(input.session_date)
            .bind(Json(&input.exercises))
            .bind(input.current_exercise_index)
            .bind(&input.notes)
            .bind(input.rpe)
            .bind(input.workout_start_time)
            .bind(Json(&input.substituted_exercises))
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Find a draft by ID regardless of status.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<WorkoutSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workout_sessions WHERE id = $1");
        sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the in-progress draft for a scoping key, if any.
    pub async fn find_active_by_scope(
        pool: &PgPool,
        user_id: DbId,
        plan_id: &str,
        day: &str,
        session_date: NaiveDate,
    ) -> Result<Option<WorkoutSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workout_sessions
             WHERE user_id = $1
               AND plan_id = $2
               AND day = $3
               AND session_date = $4
               AND status = 'in_progress'"
        );
        sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(user_id)
            .bind(plan_id)
            .bind(day)
            .bind(session_date)
            .fetch_optional(pool)
            .await
    }

    /// The user's most recently updated in-progress draft ("resume your
    /// unfinished workout").
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<WorkoutSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workout_sessions
             WHERE user_id = $1 AND status = 'in_progress'
             ORDER BY updated_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Complete a draft: copy its payload into a permanent workout record
    /// and flip the status to `completed`, in one transaction.
    ///
    /// Returns `None` when the draft is not currently in progress (the
    /// status flip is the transaction's guard, so a concurrent complete
    /// cannot double-spawn workouts). The caller maps `None` onto a state
    /// violation or not-found.
    pub async fn complete(
        pool: &PgPool,
        id: Uuid,
        input: &CompleteWorkoutSession,
    ) -> Result<Option<Workout>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE workout_sessions
             SET status = 'completed', updated_at = NOW()
             WHERE id = $1 AND status = 'in_progress'
             RETURNING {COLUMNS}"
        );
        let Some(draft) = sqlx::query_as::<_, WorkoutSession>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let workout = WorkoutRepo::create(
            &mut *tx,
            &CreateWorkout {
                user_id: draft.user_id,
                plan_id: draft.plan_id.clone(),
                performed_at: draft.workout_start_time,
                exercises: draft.exercises.0.clone(),
                duration_mins: Some(input.duration_mins),
                notes: input.notes.clone().unwrap_or_else(|| draft.notes.clone()),
                rpe: Some(input.rpe.unwrap_or(draft.rpe)),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some(workout))
    }

    /// Abandon a draft: flip `in_progress` to `abandoned`, no workout
    /// record. Returns `true` if a row was flipped; abandoning an already
    /// abandoned draft matches nothing and the caller treats it as a no-op.
    pub async fn abandon(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workout_sessions
             SET status = 'abandoned', updated_at = NOW()
             WHERE id = $1 AND status = 'in_progress'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
