//! User model and DTOs.

use liftlog_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A user row from the `users` table.
///
/// Deliberately not `Serialize`: it carries the credential hash. Handlers
/// build their own public projections.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub equipment: Json<Vec<String>>,
    pub exercise_preference: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user at registration.
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}
