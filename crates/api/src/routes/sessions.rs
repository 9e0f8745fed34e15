//! Route definitions for session and recovery-code management.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{recovery, sessions};
use crate::state::AppState;

/// User-scoped routes mounted at `/users`.
///
/// ```text
/// GET  /{user_id}/sessions                -> list_sessions
/// POST /{user_id}/sessions/revoke-others  -> revoke_other_sessions
/// POST /{user_id}/recovery-codes          -> generate recovery codes
/// GET  /{user_id}/recovery-codes          -> count unused codes
/// ```
pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/sessions", get(sessions::list_sessions))
        .route(
            "/{user_id}/sessions/revoke-others",
            post(sessions::revoke_other_sessions),
        )
        .route(
            "/{user_id}/recovery-codes",
            post(recovery::generate_codes).get(recovery::count_codes),
        )
}

/// Routes mounted at `/sessions`.
///
/// ```text
/// DELETE /{session_id} -> revoke_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{session_id}", delete(sessions::revoke_session))
}
