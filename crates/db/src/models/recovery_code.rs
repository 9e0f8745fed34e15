//! Recovery code model.

use liftlog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `recovery_codes` table. `used_at` is set exactly once,
/// when the code is redeemed.
#[derive(Debug, Clone, FromRow)]
pub struct RecoveryCode {
    pub id: DbId,
    pub user_id: DbId,
    pub code_hash: String,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
