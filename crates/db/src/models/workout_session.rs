//! Workout draft model (the sync engine's mutable record) and DTOs.

use chrono::NaiveDate;
use liftlog_core::types::{DbId, Timestamp};
use liftlog_core::workout::{ExerciseEntry, SubstitutionMap};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a workout draft. `Completed` and `Abandoned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workout_session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkoutSessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

/// A row from the `workout_sessions` table.
///
/// JSONB payload columns are typed: a row whose payload no longer
/// deserializes surfaces as a decode error instead of silently collapsing
/// to an empty collection.
#[derive(Debug, Clone, FromRow)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: DbId,
    pub plan_id: String,
    pub day: String,
    pub session_date: NaiveDate,
    pub status: WorkoutSessionStatus,
    pub exercises: Json<Vec<ExerciseEntry>>,
    pub current_exercise_index: i32,
    pub notes: String,
    pub rpe: i32,
    pub workout_start_time: Timestamp,
    pub substituted_exercises: Json<SubstitutionMap>,
    pub sync_version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO carrying one sync push: the scoping key plus the full draft payload.
///
/// The repository applies it either as the initial insert (version 1) or as
/// a compare-and-swap update against an existing in-progress row.
#[derive(Debug, Clone)]
pub struct SyncWorkoutSession {
    pub user_id: DbId,
    pub plan_id: String,
    pub day: String,
    pub session_date: NaiveDate,
    pub exercises: Vec<ExerciseEntry>,
    pub current_exercise_index: i32,
    pub notes: String,
    pub rpe: i32,
    pub workout_start_time: Timestamp,
    pub substituted_exercises: SubstitutionMap,
}

/// DTO for completing a draft into a permanent workout.
#[derive(Debug, Clone)]
pub struct CompleteWorkoutSession {
    pub duration_mins: i32,
    /// Overrides the draft's notes when present.
    pub notes: Option<String>,
    /// Overrides the draft's perceived-exertion rating when present.
    pub rpe: Option<i32>,
}
