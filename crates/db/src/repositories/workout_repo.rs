//! Repository for the `workouts` table (permanent records).

use liftlog_core::types::DbId;
use sqlx::postgres::PgExecutor;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::workout::{CreateWorkout, Workout};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, plan_id, performed_at, exercises, \
                        duration_mins, notes, rpe, created_at, updated_at";

/// Provides operations for permanent workout records.
pub struct WorkoutRepo;

impl WorkoutRepo {
    /// Insert a workout record, returning the created row.
    ///
    /// Takes any executor so draft completion can run it inside the same
    /// transaction as the status flip.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateWorkout,
    ) -> Result<Workout, sqlx::Error> {
        let query = format!(
            "INSERT INTO workouts (user_id, plan_id, performed_at, exercises,
                                   duration_mins, notes, rpe)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workout>(&query)
            .bind(input.user_id)
            .bind(&input.plan_id)
            .bind(input.performed_at)
            .bind(Json(&input.exercises))
            .bind(input.duration_mins)
            .bind(&input.notes)
            .bind(input.rpe)
            .fetch_one(executor)
            .await
    }

    /// Find a workout by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workout>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workouts WHERE id = $1");
        sqlx::query_as::<_, Workout>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
