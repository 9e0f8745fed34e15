//! Handlers for single-use account recovery codes.
//!
//! Codes are shown in plaintext exactly once, at generation; only argon2
//! hashes are stored. Redeeming a code behaves like a normal login: it
//! creates a session and returns the usual credential bundle.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use liftlog_core::error::CoreError;
use liftlog_core::recovery::{generate_recovery_codes, normalize_recovery_code};
use liftlog_core::types::DbId;
use serde::{Deserialize, Serialize};

use liftlog_db::repositories::{RecoveryCodeRepo, UserRepo};

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{create_auth_response, AuthResponse};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Number of codes issued per generation.
const CODE_SET_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response body for `POST /users/{user_id}/recovery-codes`.
#[derive(Debug, Serialize)]
pub struct GenerateCodesResponse {
    pub codes: Vec<String>,
    pub warning: &'static str,
}

/// Response body for `GET /users/{user_id}/recovery-codes`.
#[derive(Debug, Serialize)]
pub struct CodeCountResponse {
    pub count: i64,
}

/// Request body for `POST /auth/recovery-login`.
#[derive(Debug, Deserialize)]
pub struct RecoveryLoginRequest {
    pub email: String,
    pub code: String,
}

/// Response body for a successful recovery login: the normal credential
/// bundle plus how many codes remain.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryLoginResponse {
    #[serde(flatten)]
    pub auth: AuthResponse,
    pub remaining_codes: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users/{user_id}/recovery-codes
///
/// Replace the user's recovery codes with a freshly generated set and
/// return the plaintext codes (the only time they are shown).
pub async fn generate_codes(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<GenerateCodesResponse>> {
    if auth_user.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only manage your own recovery codes".into(),
        )));
    }

    let codes = generate_recovery_codes(CODE_SET_SIZE);

    let mut hashes = Vec::with_capacity(codes.len());
    for code in &codes {
        let hash = hash_password(&normalize_recovery_code(code))
            .map_err(|e| AppError::InternalError(format!("Code hashing error: {e}")))?;
        hashes.push(hash);
    }

    RecoveryCodeRepo::replace_for_user(&state.pool, user_id, &hashes).await?;
    tracing::info!(user_id, count = codes.len(), "Recovery codes regenerated");

    Ok(Json(GenerateCodesResponse {
        codes,
        warning: "Save these codes in a secure location. They will not be shown again.",
    }))
}

/// GET /api/v1/users/{user_id}/recovery-codes
///
/// Count the user's unredeemed recovery codes.
pub async fn count_codes(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<CodeCountResponse>> {
    if auth_user.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only view your own recovery codes".into(),
        )));
    }

    let count = RecoveryCodeRepo::count_unused(&state.pool, user_id).await?;
    Ok(Json(CodeCountResponse { count }))
}

/// POST /api/v1/auth/recovery-login
///
/// Authenticate with a single-use recovery code. A matched code is marked
/// used before credentials are issued; every failure path returns the same
/// response so codes cannot be enumerated.
pub async fn recovery_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RecoveryLoginRequest>,
) -> AppResult<Json<RecoveryLoginResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid)?;

    let normalized = normalize_recovery_code(&input.code);
    let candidates = RecoveryCodeRepo::list_unused(&state.pool, user.id).await?;

    let mut matched = None;
    for candidate in &candidates {
        let ok = verify_password(&normalized, &candidate.code_hash)
            .map_err(|e| AppError::InternalError(format!("Code verification error: {e}")))?;
        if ok {
            matched = Some(candidate);
            break;
        }
    }
    let matched = matched.ok_or_else(invalid)?;

    // Single-use: a concurrent redemption of the same code loses here.
    if !RecoveryCodeRepo::mark_used(&state.pool, matched.id).await? {
        return Err(invalid());
    }

    let auth = create_auth_response(&state, &user, &headers).await?;
    let remaining_codes = RecoveryCodeRepo::count_unused(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, remaining_codes, "Recovery code redeemed");

    Ok(Json(RecoveryLoginResponse {
        auth,
        remaining_codes,
    }))
}
