//! JWT-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use liftlog_core::types::DbId;
use uuid::Uuid;

use crate::auth::jwt::validate_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// Every rejection is [`AppError::AccessTokenInvalid`]: a missing header, a
/// malformed token, a bad signature, and an expired token are deliberately
/// indistinguishable to the client.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's email (from `claims.email`).
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::AccessTokenInvalid)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::AccessTokenInvalid)?;

        let claims = validate_access_token(token, &state.config.jwt)
            .map_err(|_| AppError::AccessTokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

/// The session the caller says it is on, read from the `X-Session-Id`
/// header.
///
/// `None` when the header is absent or not a UUID -- the header marks which
/// row is "current" in session lists and is excluded from bulk revocation;
/// it is never authentication material, so a bad value is not an error.
#[derive(Debug, Clone, Copy)]
pub struct CurrentSession(pub Option<Uuid>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session_id = parts
            .headers
            .get("x-session-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok());

        Ok(CurrentSession(session_id))
    }
}

/// Best-effort client IP from proxy headers.
///
/// Prefers the first `X-Forwarded-For` hop, then `X-Real-IP`. Returns
/// `None` when neither is present; the value is display metadata for the
/// session list, nothing more.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
