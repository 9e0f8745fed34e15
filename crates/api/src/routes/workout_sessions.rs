//! Route definitions for the workout-session sync engine.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workout_sync;
use crate::state::AppState;

/// Routes mounted at `/workout-sessions`.
///
/// ```text
/// POST   /sync                    -> sync (create or update draft)
/// GET    /active/{user_id}        -> get_active
/// GET    /{session_id}            -> get_session
/// DELETE /{session_id}            -> abandon
/// POST   /{session_id}/complete   -> complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync", post(workout_sync::sync))
        .route("/active/{user_id}", get(workout_sync::get_active))
        .route(
            "/{session_id}",
            get(workout_sync::get_session).delete(workout_sync::abandon),
        )
        .route("/{session_id}/complete", post(workout_sync::complete))
}
