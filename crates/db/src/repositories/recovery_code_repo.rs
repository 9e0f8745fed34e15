//! Repository for the `recovery_codes` table.

use liftlog_core::types::DbId;
use sqlx::PgPool;

use crate::models::recovery_code::RecoveryCode;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, code_hash, used_at, created_at";

/// Provides operations for single-use recovery codes.
pub struct RecoveryCodeRepo;

impl RecoveryCodeRepo {
    /// Replace a user's entire code set: delete every existing code (used
    /// or not) and insert the new hashes, in one transaction.
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: DbId,
        code_hashes: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM recovery_codes WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for hash in code_hashes {
            sqlx::query("INSERT INTO recovery_codes (user_id, code_hash) VALUES ($1, $2)")
                .bind(user_id)
                .bind(hash)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// List a user's unredeemed codes, oldest first.
    pub async fn list_unused(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RecoveryCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recovery_codes
             WHERE user_id = $1 AND used_at IS NULL
             ORDER BY created_at"
        );
        sqlx::query_as::<_, RecoveryCode>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Count a user's unredeemed codes.
    pub async fn count_unused(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM recovery_codes WHERE user_id = $1 AND used_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Redeem a code. Returns `true` if the row was unredeemed until now;
    /// a second redemption of the same code matches nothing.
    pub async fn mark_used(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE recovery_codes SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
