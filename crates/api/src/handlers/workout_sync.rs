//! Handlers for the workout-session sync engine.
//!
//! A client periodically pushes its local draft here while a workout is
//! being logged. Writes are optimistic: the client presents the version it
//! last observed and the store only applies the update if that version is
//! still current (a single compare-and-swap UPDATE). The loser receives
//! the server's draft and version to reconcile against -- nothing blocks.

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use liftlog_core::error::CoreError;
use liftlog_core::types::{DbId, Timestamp};
use liftlog_core::workout::{ExerciseEntry, SubstitutionMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use liftlog_db::models::workout_session::{
    CompleteWorkoutSession, SyncWorkoutSession, WorkoutSession, WorkoutSessionStatus,
};
use liftlog_db::repositories::WorkoutSessionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Draft payload defaults applied when a client omits optional fields.
const DEFAULT_RPE: i32 = 5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /workout-sessions/sync`: the scoping key, the
/// full draft payload, and the version the client last observed.
///
/// `lastSyncVersion = null` is a blind last-write-wins overwrite -- see
/// DESIGN.md for why this path is kept.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub user_id: DbId,
    #[validate(length(min = 1, message = "planId must not be empty"))]
    pub plan_id: String,
    #[validate(length(min = 1, message = "day must not be empty"))]
    pub day: String,
    pub session_date: NaiveDate,
    pub exercises: Vec<ExerciseEntry>,
    pub current_exercise_index: Option<i32>,
    pub notes: Option<String>,
    #[validate(range(min = 1, max = 10, message = "rpe must be between 1 and 10"))]
    pub rpe: Option<i32>,
    pub workout_start_time: Timestamp,
    pub substituted_exercises: Option<SubstitutionMap>,
    pub last_sync_version: Option<i64>,
}

/// Acknowledgement for an accepted sync push.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub session: SyncAck,
}

/// The fields a client needs to continue syncing: the draft id and the
/// version its next push must present.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAck {
    pub id: Uuid,
    pub sync_version: i64,
    pub updated_at: Timestamp,
}

/// The server's current draft, returned with a 409 so the losing client
/// can merge or discard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSessionView {
    pub sync_version: i64,
    pub exercises: Vec<ExerciseEntry>,
    pub current_exercise_index: i32,
    pub notes: String,
    pub rpe: i32,
    pub workout_start_time: Timestamp,
    pub substituted_exercises: SubstitutionMap,
    pub updated_at: Timestamp,
}

impl From<WorkoutSession> for ServerSessionView {
    fn from(session: WorkoutSession) -> Self {
        ServerSessionView {
            sync_version: session.sync_version,
            exercises: session.exercises.0,
            current_exercise_index: session.current_exercise_index,
            notes: session.notes,
            rpe: session.rpe,
            workout_start_time: session.workout_start_time,
            substituted_exercises: session.substituted_exercises.0,
            updated_at: session.updated_at,
        }
    }
}

/// Full draft projection for fetch endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub id: Uuid,
    pub user_id: DbId,
    pub plan_id: String,
    pub day: String,
    pub session_date: NaiveDate,
    pub status: WorkoutSessionStatus,
    pub exercises: Vec<ExerciseEntry>,
    pub current_exercise_index: i32,
    pub notes: String,
    pub rpe: i32,
    pub workout_start_time: Timestamp,
    pub substituted_exercises: SubstitutionMap,
    pub sync_version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<WorkoutSession> for DraftView {
    fn from(session: WorkoutSession) -> Self {
        DraftView {
            id: session.id,
            user_id: session.user_id,
            plan_id: session.plan_id,
            day: session.day,
            session_date: session.session_date,
            status: session.status,
            exercises: session.exercises.0,
            current_exercise_index: session.current_exercise_index,
            notes: session.notes,
            rpe: session.rpe,
            workout_start_time: session.workout_start_time,
            substituted_exercises: session.substituted_exercises.0,
            sync_version: session.sync_version,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// Response body for `GET /workout-sessions/active/{user_id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionResponse {
    pub has_active_session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<DraftView>,
}

/// Response body for `GET /workout-sessions/{session_id}`.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: DraftView,
}

/// Request body for `POST /workout-sessions/{session_id}/complete`.
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRequest {
    /// Total workout duration in minutes.
    pub duration: i32,
    pub notes: Option<String>,
    #[validate(range(min = 1, max = 10, message = "rpe must be between 1 and 10"))]
    pub rpe: Option<i32>,
}

/// Response body for a successful completion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub success: bool,
    pub workout_id: DbId,
    pub session_id: Uuid,
}

/// Response body for a successful abandon.
#[derive(Debug, Serialize)]
pub struct AbandonResponse {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/workout-sessions/sync
///
/// Create or update the in-progress draft for the request's scoping key.
///
/// - No draft for the key: create one at version 1 (`lastSyncVersion` is
///   ignored on first creation).
/// - Draft exists, `lastSyncVersion` matches (or is null): apply and
///   increment the version.
/// - Draft exists, `lastSyncVersion` is stale: 409 with the server draft;
///   stored state is not mutated.
pub async fn sync(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SyncRequest>,
) -> AppResult<Json<SyncResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    // The body's userId scopes the draft; it must be the caller.
    if input.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only sync your own workout sessions".into(),
        )));
    }

    let last_sync_version = input.last_sync_version;
    let draft = SyncWorkoutSession {
        user_id: input.user_id,
        plan_id: input.plan_id,
        day: input.day,
        session_date: input.session_date,
        exercises: input.exercises,
        current_exercise_index: input.current_exercise_index.unwrap_or(0),
        notes: input.notes.unwrap_or_default(),
        rpe: input.rpe.unwrap_or(DEFAULT_RPE),
        workout_start_time: input.workout_start_time,
        substituted_exercises: input.substituted_exercises.unwrap_or_default(),
    };

    // Two rounds: if the draft we lost a CAS against turns out to have been
    // completed/abandoned in the meantime, the second round creates fresh.
    for _ in 0..2 {
        if let Some(created) = WorkoutSessionRepo::insert_active(&state.pool, &draft).await? {
            tracing::info!(
                user_id = created.user_id,
                session_id = %created.id,
                "Workout draft created"
            );
            return Ok(Json(ack(created)));
        }

        if let Some(updated) =
            WorkoutSessionRepo::update_active(&state.pool, &draft, last_sync_version).await?
        {
            return Ok(Json(ack(updated)));
        }

        // The CAS matched nothing: either the client's version is stale, or
        // the draft left in_progress between our insert and update.
        if let Some(server) = WorkoutSessionRepo::find_active_by_scope(
            &state.pool,
            draft.user_id,
            &draft.plan_id,
            &draft.day,
            draft.session_date,
        )
        .await?
        {
            tracing::debug!(
                session_id = %server.id,
                server_version = server.sync_version,
                client_version = ?last_sync_version,
                "Sync conflict"
            );
            return Err(AppError::SyncConflict(Box::new(server.into())));
        }
    }

    Err(AppError::InternalError(
        "Workout draft changed state repeatedly during sync".into(),
    ))
}

/// GET /api/v1/workout-sessions/active/{user_id}
///
/// The user's most recently updated in-progress draft, used on app start
/// to offer "resume your unfinished workout".
pub async fn get_active(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<ActiveSessionResponse>> {
    if user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only access your own workout sessions".into(),
        )));
    }

    let session = WorkoutSessionRepo::find_active_for_user(&state.pool, user_id).await?;

    Ok(Json(ActiveSessionResponse {
        has_active_session: session.is_some(),
        session: session.map(DraftView::from),
    }))
}

/// GET /api/v1/workout-sessions/{session_id}
pub async fn get_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let session = find_owned(&state, session_id, &auth_user).await?;

    Ok(Json(SessionResponse {
        session: session.into(),
    }))
}

/// POST /api/v1/workout-sessions/{session_id}/complete
///
/// Materialize the draft into a permanent workout record and mark it
/// completed -- both in one transaction. Completing anything but an
/// in-progress draft is a state violation.
pub async fn complete(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<CompleteRequest>,
) -> AppResult<Json<CompleteResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let session = find_owned(&state, session_id, &auth_user).await?;

    if session.status != WorkoutSessionStatus::InProgress {
        return Err(AppError::Core(CoreError::InvalidState(
            "Session is not in progress".into(),
        )));
    }

    let workout = WorkoutSessionRepo::complete(
        &state.pool,
        session_id,
        &CompleteWorkoutSession {
            duration_mins: input.duration,
            notes: input.notes,
            rpe: input.rpe,
        },
    )
    .await?
    // A concurrent complete/abandon won the status flip.
    .ok_or_else(|| {
        AppError::Core(CoreError::InvalidState("Session is not in progress".into()))
    })?;

    tracing::info!(
        user_id = auth_user.user_id,
        session_id = %session_id,
        workout_id = workout.id,
        "Workout draft completed"
    );

    Ok(Json(CompleteResponse {
        success: true,
        workout_id: workout.id,
        session_id,
    }))
}

/// DELETE /api/v1/workout-sessions/{session_id}
///
/// Abandon the draft. Abandoning an already-abandoned draft is a no-op
/// that still succeeds; abandoning a completed draft is a state violation
/// (the workout record already exists).
pub async fn abandon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<AbandonResponse>> {
    let session = find_owned(&state, session_id, &auth_user).await?;

    match session.status {
        WorkoutSessionStatus::InProgress => {
            WorkoutSessionRepo::abandon(&state.pool, session_id).await?;
            tracing::info!(
                user_id = auth_user.user_id,
                session_id = %session_id,
                "Workout draft abandoned"
            );
        }
        WorkoutSessionStatus::Abandoned => {}
        WorkoutSessionStatus::Completed => {
            return Err(AppError::Core(CoreError::InvalidState(
                "Cannot abandon a completed session".into(),
            )));
        }
    }

    Ok(Json(AbandonResponse { success: true }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ack(session: WorkoutSession) -> SyncResponse {
    SyncResponse {
        success: true,
        session: SyncAck {
            id: session.id,
            sync_version: session.sync_version,
            updated_at: session.updated_at,
        },
    }
}

/// Fetch a draft and enforce that the caller owns it.
async fn find_owned(
    state: &AppState,
    session_id: Uuid,
    auth_user: &AuthUser,
) -> AppResult<WorkoutSession> {
    let session = WorkoutSessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "WorkoutSession",
                id: session_id.to_string(),
            })
        })?;

    if session.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only access your own workout sessions".into(),
        )));
    }

    Ok(session)
}
