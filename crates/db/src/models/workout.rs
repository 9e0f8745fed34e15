//! Permanent workout record model and DTOs.

use liftlog_core::types::{DbId, Timestamp};
use liftlog_core::workout::ExerciseEntry;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `workouts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workout {
    pub id: DbId,
    pub user_id: DbId,
    pub plan_id: String,
    pub performed_at: Timestamp,
    pub exercises: Json<Vec<ExerciseEntry>>,
    pub duration_mins: Option<i32>,
    pub notes: String,
    pub rpe: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a workout record (used by draft completion).
pub struct CreateWorkout {
    pub user_id: DbId,
    pub plan_id: String,
    pub performed_at: Timestamp,
    pub exercises: Vec<ExerciseEntry>,
    pub duration_mins: Option<i32>,
    pub notes: String,
    pub rpe: Option<i32>,
}
