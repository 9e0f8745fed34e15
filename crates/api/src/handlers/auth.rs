//! Handlers for the `/auth` resource (register, login, refresh, logout).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use liftlog_core::device::parse_user_agent;
use liftlog_core::error::CoreError;
use liftlog_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use liftlog_db::models::session::CreateSession;
use liftlog_db::models::user::{CreateUser, User};
use liftlog_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{generate_access_token, generate_refresh_secret, hash_refresh_secret};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{client_ip, AuthUser, CurrentSession};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`. The secret is opaque; the session
/// id names the ledger row it must hash-match against.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_secret: String,
    pub session_id: Uuid,
}

/// Response body for a successful refresh: a new access token AND a new
/// refresh secret, still bound to the same session id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_secret: String,
    pub session_id: Uuid,
}

/// Successful authentication response returned by register, login, and
/// recovery login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserInfo,
    pub access_token: String,
    pub refresh_secret: String,
    pub session_id: Uuid,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Public user info embedded in [`AuthResponse`]. Never includes the
/// credential hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account and log the device straight in (tokens + session).
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    if let Err(requirements) = validate_password_strength(&input.password) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Password does not meet security requirements: {}",
            requirements.join(", ")
        ))));
    }

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "User already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // Default the display name to the email's local part.
    let name = input
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| input.email.split('@').next().unwrap_or_default().to_string());

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            password_hash,
            name,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    let response = create_auth_response(&state, &user, &headers).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Creates a session row for this
/// device and returns access + refresh credentials bound to it.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Unknown email and wrong password produce the same response.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid credentials".into())))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid credentials".into(),
        )));
    }

    let response = create_auth_response(&state, &user, &headers).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid `(refreshSecret, sessionId)` pair for a new access
/// token and a new refresh secret (single-use rotation).
///
/// The rotation is one compare-and-swap statement on the stored hash, so a
/// replayed or concurrently-used old secret fails here with
/// `REFRESH_TOKEN_INVALID` -- the client must treat that as a hard logout.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let presented_hash = hash_refresh_secret(&input.refresh_secret);

    // Read-only validation first so the new access token can be minted
    // before anything is overwritten. The rotation below is the final,
    // infallible-after step: a rotation can never happen without the new
    // credentials being handed back.
    let session = SessionRepo::validate_refresh(&state.pool, input.session_id, &presented_hash)
        .await?
        .ok_or(AppError::RefreshTokenInvalid)?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or(AppError::RefreshTokenInvalid)?;

    let access_token = generate_access_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (new_secret, new_hash) = generate_refresh_secret();

    // CAS on the presented hash: if the session was rotated or revoked
    // since the validation read, this matches nothing and the caller loses.
    let session = SessionRepo::rotate_refresh(
        &state.pool,
        input.session_id,
        &presented_hash,
        &new_hash,
    )
    .await?
    .ok_or(AppError::RefreshTokenInvalid)?;

    tracing::debug!(user_id = user.id, session_id = %session.id, "Refresh secret rotated");

    Ok(Json(RefreshResponse {
        access_token,
        refresh_secret: new_secret,
        session_id: session.id,
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke the session named by `X-Session-Id`. Returns 204 No Content.
/// Revoking is terminal and idempotent; logging out an already-revoked or
/// missing session still succeeds.
pub async fn logout(
    auth_user: AuthUser,
    CurrentSession(current): CurrentSession,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    let session_id =
        current.ok_or_else(|| AppError::BadRequest("X-Session-Id header required".into()))?;

    if let Some(session) = SessionRepo::find_by_id(&state.pool, session_id).await? {
        if session.user_id != auth_user.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "You can only log out your own session".into(),
            )));
        }
        SessionRepo::revoke(&state.pool, session_id).await?;
        tracing::info!(user_id = auth_user.user_id, session_id = %session_id, "Session revoked on logout");
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh credentials, persist a session row capturing
/// the device descriptor and network origin, and build the response.
///
/// The descriptor is derived from the User-Agent exactly once, here; it is
/// never updated on later requests from the same session.
pub(crate) async fn create_auth_response(
    state: &AppState,
    user: &User,
    headers: &HeaderMap,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_secret, refresh_hash) = generate_refresh_secret();

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let descriptor = parse_user_agent(user_agent.as_deref());
    let ip_address = client_ip(headers);

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let session = SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            device_name: descriptor.device_name,
            device_type: descriptor.device_type.as_str().to_string(),
            user_agent,
            ip_address,
            expires_at,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        session_id = %session.id,
        device_name = %session.device_name,
        "Session created"
    );

    Ok(AuthResponse {
        user: UserInfo::from(user),
        access_token,
        refresh_secret,
        session_id: session.id,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
    })
}
