//! Handlers for device-session management (list, revoke, revoke others).
//!
//! Ownership is always checked against the authenticated principal and the
//! path parameter -- ids in request bodies are never trusted for this.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use liftlog_core::error::CoreError;
use liftlog_core::types::{DbId, Timestamp};
use serde::Serialize;
use uuid::Uuid;

use liftlog_db::models::session::Session;
use liftlog_db::repositories::SessionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, CurrentSession};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One row of the session list shown on the "manage devices" screen.
///
/// `isCurrent` is computed per request from the `X-Session-Id` header; it
/// is never persisted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub device_name: String,
    pub device_type: String,
    pub ip_address: Option<String>,
    pub last_used_at: Timestamp,
    pub created_at: Timestamp,
    pub is_current: bool,
}

impl SessionView {
    fn from_session(session: &Session, current: Option<Uuid>) -> Self {
        SessionView {
            id: session.id,
            device_name: session.device_name.clone(),
            device_type: session.device_type.clone(),
            ip_address: session.ip_address.clone(),
            last_used_at: session.last_used_at,
            created_at: session.created_at,
            is_current: current == Some(session.id),
        }
    }
}

/// Response body for `GET /users/{user_id}/sessions`.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionView>,
}

/// Response body for `POST /users/{user_id}/sessions/revoke-others`.
#[derive(Debug, Serialize)]
pub struct RevokeOthersResponse {
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/{user_id}/sessions
///
/// List the user's usable sessions, most recently used first.
pub async fn list_sessions(
    auth_user: AuthUser,
    CurrentSession(current): CurrentSession,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<SessionListResponse>> {
    if auth_user.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only view your own sessions".into(),
        )));
    }

    let sessions = SessionRepo::list_active_for_user(&state.pool, user_id).await?;
    let views = sessions
        .iter()
        .map(|s| SessionView::from_session(s, current))
        .collect();

    Ok(Json(SessionListResponse { sessions: views }))
}

/// DELETE /api/v1/sessions/{session_id}
///
/// Revoke a single session. Revocation is terminal; revoking twice is a
/// no-op that still returns 204.
pub async fn revoke_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let session = SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Session",
                id: session_id.to_string(),
            })
        })?;

    if session.user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only revoke your own sessions".into(),
        )));
    }

    SessionRepo::revoke(&state.pool, session_id).await?;
    tracing::info!(user_id = auth_user.user_id, session_id = %session_id, "Session revoked");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/{user_id}/sessions/revoke-others
///
/// Revoke every active session for the user except the one named by
/// `X-Session-Id` ("log out all other devices"). Returns the count revoked.
pub async fn revoke_other_sessions(
    auth_user: AuthUser,
    CurrentSession(current): CurrentSession,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<RevokeOthersResponse>> {
    if auth_user.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only revoke your own sessions".into(),
        )));
    }

    let count = SessionRepo::revoke_all_except(&state.pool, user_id, current).await?;
    tracing::info!(user_id, count, "Revoked other sessions");

    Ok(Json(RevokeOthersResponse { count }))
}
