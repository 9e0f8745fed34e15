//! Repository for the `sessions` table.
//!
//! Refresh validation and rotation are deliberately single statements: the
//! stored hash is part of every WHERE clause, so two concurrent rotations
//! cannot both succeed and a revocation is visible to the very next call.

use liftlog_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, refresh_token_hash, device_name, device_type, \
                        user_agent, ip_address, is_revoked, last_used_at, \
                        created_at, expires_at";

/// Provides ledger operations for device sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, refresh_token_hash, device_name, device_type,
                                   user_agent, ip_address, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(&input.device_name)
            .bind(&input.device_type)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by ID regardless of its state.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's usable sessions (not revoked, not expired), most
    /// recently used first.
    pub async fn list_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE user_id = $1
               AND is_revoked = false
               AND expires_at > NOW()
             ORDER BY last_used_at DESC"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Check that a presented refresh secret (already hashed) is redeemable
    /// against this session.
    ///
    /// Returns `None` for a missing, revoked, or expired session just as for
    /// a hash mismatch; callers cannot tell which check failed.
    pub async fn validate_refresh(
        pool: &PgPool,
        id: Uuid,
        presented_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE id = $1
               AND refresh_token_hash = $2
               AND is_revoked = false
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(presented_hash)
            .fetch_optional(pool)
            .await
    }

    /// Rotate the refresh secret: replace the stored hash and bump
    /// `last_used_at`, in one compare-and-swap statement keyed on the
    /// presented hash.
    ///
    /// Of two concurrent rotations only one can match the old hash; the
    /// loser (and any replayed old secret) gets `None`. `expires_at` is
    /// never extended.
    pub async fn rotate_refresh(
        pool: &PgPool,
        id: Uuid,
        presented_hash: &str,
        new_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions
             SET refresh_token_hash = $3, last_used_at = NOW()
             WHERE id = $1
               AND refresh_token_hash = $2
               AND is_revoked = false
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(presented_hash)
            .bind(new_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a single session. Returns `true` if the row was updated;
    /// revoking an already-revoked session is a no-op returning `false`.
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_revoked = true WHERE id = $1 AND is_revoked = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke all of a user's active sessions except the given one
    /// ("log out all other devices"). Returns the count of revoked rows.
    ///
    /// With `except = None` every active session for the user is revoked.
    pub async fn revoke_all_except(
        pool: &PgPool,
        user_id: DbId,
        except: Option<Uuid>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_revoked = true
             WHERE user_id = $1
               AND is_revoked = false
               AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(user_id)
        .bind(except)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete expired or revoked sessions. Expired rows fail validation
    /// lazily; this exists for an external maintenance job, not the request
    /// path. Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE expires_at < NOW() OR is_revoked = true")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
