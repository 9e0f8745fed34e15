//! Device session model and DTOs.

use liftlog_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use uuid::Uuid;

/// A session row from the `sessions` table.
///
/// The device descriptor and network origin are captured once at creation
/// and never re-derived; `expires_at` is fixed for the session's lifetime.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub device_name: String,
    pub device_type: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub is_revoked: bool,
    pub last_used_at: Timestamp,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// DTO for creating a new session at login.
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub device_name: String,
    pub device_type: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: Timestamp,
}
