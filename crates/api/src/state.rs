use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Handlers get their collaborators (pool, JWT config) from here rather than
/// from module-level globals, so they stay independently testable.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: liftlog_db::DbPool,
    /// Server configuration (JWT secrets, timeouts, CORS).
    pub config: Arc<ServerConfig>,
}
