pub mod auth;
pub mod health;
pub mod sessions;
pub mod workout_sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                               register (public)
/// /auth/login                                  login (public)
/// /auth/refresh                                refresh (public -- uses refresh secret)
/// /auth/recovery-login                         login with recovery code (public)
/// /auth/logout                                 logout current session (requires auth)
///
/// /users/{user_id}/sessions                    list sessions
/// /users/{user_id}/sessions/revoke-others      revoke all but current (POST)
/// /users/{user_id}/recovery-codes              regenerate (POST), count (GET)
///
/// /sessions/{session_id}                       revoke one session (DELETE)
///
/// /workout-sessions/sync                       push draft (POST)
/// /workout-sessions/active/{user_id}           resume lookup (GET)
/// /workout-sessions/{session_id}               get (GET), abandon (DELETE)
/// /workout-sessions/{session_id}/complete      complete into workout (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, refresh, logout).
        .nest("/auth", auth::router())
        // Per-user session and recovery-code management.
        .nest("/users", sessions::user_router())
        // Direct session revocation.
        .nest("/sessions", sessions::router())
        // Workout draft sync engine.
        .nest("/workout-sessions", workout_sessions::router())
}
