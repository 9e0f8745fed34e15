use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use liftlog_core::error::CoreError;
use serde_json::json;

use crate::handlers::workout_sync::ServerSessionView;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent `{error, code}` JSON
/// bodies; the `code` field is part of the client contract (clients branch
/// on `REFRESH_TOKEN_INVALID` and `TOKEN_EXPIRED`).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `liftlog_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The access token is missing, malformed, expired, or of the wrong
    /// type. Reported uniformly: the client's only move is to refresh or
    /// re-authenticate, and the distinction would leak validation detail.
    #[error("Invalid or expired access token")]
    AccessTokenInvalid,

    /// A refresh attempt failed (unknown session, revoked, expired, or
    /// secret mismatch -- indistinguishable by design). Clients treat this
    /// as a hard logout.
    #[error("Invalid or expired refresh token")]
    RefreshTokenInvalid,

    /// A sync push lost the optimistic-concurrency race. Carries the
    /// server's current draft so the losing client can reconcile. This is
    /// an expected outcome, not a fault.
    #[error("Workout session sync conflict")]
    SyncConflict(Box<ServerSessionView>),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::InvalidState(msg) => {
                    (StatusCode::CONFLICT, "INVALID_STATE", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Auth failures with machine codes the client branches on ---
            AppError::AccessTokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Invalid or expired access token".to_string(),
            ),
            AppError::RefreshTokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "REFRESH_TOKEN_INVALID",
                "Invalid or expired refresh token".to_string(),
            ),

            // --- Sync conflict: bespoke body carrying the server draft ---
            AppError::SyncConflict(server) => {
                let body = json!({
                    "error": "Session was updated by another device",
                    "conflict": true,
                    "serverSession": server,
                });
                return (StatusCode::CONFLICT, axum::Json(body)).into_response();
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - `ColumnDecode` means a stored JSONB payload no longer matches its
///   schema; it is logged as corruption rather than masked with an empty
///   collection.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        sqlx::Error::ColumnDecode { index, source } => {
            tracing::error!(column = %index, error = %source, "Corrupt stored payload");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
