//! HTTP-level integration tests for multi-device session management:
//! listing, device descriptors, revocation, and bulk revocation.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, get_auth, login_user, post_json, register_user};
use sqlx::PgPool;

const CHROME_MAC_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const SAFARI_IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

// ---------------------------------------------------------------------------
// Session list
// ---------------------------------------------------------------------------

/// The session list carries the device descriptor and origin captured at
/// login, and marks the row matching X-Session-Id as current.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_sessions_with_device_metadata(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register_user(app, "devices@test.com").await;

    // Log in from a desktop browser behind a proxy...
    let app = common::build_test_app(pool.clone());
    let desktop = login_user(
        app,
        "devices@test.com",
        &[
            ("user-agent", CHROME_MAC_UA),
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
        ],
    )
    .await;

    // ...and from a phone.
    let app = common::build_test_app(pool.clone());
    let phone = login_user(app, "devices@test.com", &[("user-agent", SAFARI_IPHONE_UA)]).await;

    let auth = format!("Bearer {}", phone.access_token);
    let uri = format!("/api/v1/users/{}/sessions", phone.user_id);
    let app = common::build_test_app(pool);
    let response = common::request(
        app,
        Method::GET,
        &uri,
        None,
        &[("authorization", &auth), ("x-session-id", &phone.session_id)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let sessions = json["sessions"].as_array().expect("sessions array");
    // Registration + two logins.
    assert_eq!(sessions.len(), 3);

    let desktop_row = sessions
        .iter()
        .find(|s| s["id"] == desktop.session_id.as_str())
        .expect("desktop session should be listed");
    assert_eq!(desktop_row["deviceName"], "Chrome on macOS");
    assert_eq!(desktop_row["deviceType"], "desktop");
    assert_eq!(desktop_row["ipAddress"], "203.0.113.7");
    assert_eq!(desktop_row["isCurrent"], false);

    let phone_row = sessions
        .iter()
        .find(|s| s["id"] == phone.session_id.as_str())
        .expect("phone session should be listed");
    assert_eq!(phone_row["deviceName"], "Safari on iOS");
    assert_eq!(phone_row["deviceType"], "mobile");
    assert_eq!(
        phone_row["isCurrent"], true,
        "the X-Session-Id row must be marked current"
    );
}

/// Listing another user's sessions is forbidden even with a valid token.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_sessions_forbidden_for_other_user(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let alice = register_user(app, "alice@test.com").await;
    let app = common::build_test_app(pool.clone());
    let mallory = register_user(app, "mallory@test.com").await;

    let uri = format!("/api/v1/users/{}/sessions", alice.user_id);
    let app = common::build_test_app(pool);
    let response = get_auth(app, &uri, &mallory.access_token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Single revocation
// ---------------------------------------------------------------------------

/// Revoking a session kills its refresh capability; revoking it again
/// still succeeds.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_revoke_session(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let login = register_user(app, "revoke@test.com").await;
    let app = common::build_test_app(pool.clone());
    let other = login_user(app, "revoke@test.com", &[]).await;

    let uri = format!("/api/v1/sessions/{}", other.session_id);
    let app = common::build_test_app(pool.clone());
    let response = common::delete_auth(app, &uri, &login.access_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The revoked session cannot refresh.
    let body = serde_json::json!({
        "refreshSecret": other.refresh_secret,
        "sessionId": other.session_id,
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Idempotent: a second revoke still returns 204.
    let app = common::build_test_app(pool);
    let response = common::delete_auth(app, &uri, &login.access_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

/// A session can only be revoked by its owner.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_revoke_session_forbidden_for_other_user(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let alice = register_user(app, "alice2@test.com").await;
    let app = common::build_test_app(pool.clone());
    let mallory = register_user(app, "mallory2@test.com").await;

    let uri = format!("/api/v1/sessions/{}", alice.session_id);
    let app = common::build_test_app(pool.clone());
    let response = common::delete_auth(app, &uri, &mallory.access_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Alice's session is untouched.
    let body = serde_json::json!({
        "refreshSecret": alice.refresh_secret,
        "sessionId": alice.session_id,
    });
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Revoking an unknown session id is a 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_revoke_unknown_session(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let login = register_user(app, "unknown@test.com").await;

    let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
    let app = common::build_test_app(pool);
    let response = common::delete_auth(app, &uri, &login.access_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Bulk revocation
// ---------------------------------------------------------------------------

/// The full multi-device scenario over HTTP: device A rotates its secret,
/// device B logs in, A revokes all others. B's refresh dies; A's refresh
/// with the rotated secret survives.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_revoke_others_excludes_current(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let device_a = register_user(app, "multi@test.com").await;

    // A refreshes: R0 -> R1.
    let body = serde_json::json!({
        "refreshSecret": device_a.refresh_secret,
        "sessionId": device_a.session_id,
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let secret_r1 = json["refreshSecret"].as_str().unwrap().to_string();
    let token_a = json["accessToken"].as_str().unwrap().to_string();

    // The pre-rotation secret is already dead.
    let body = serde_json::json!({
        "refreshSecret": device_a.refresh_secret,
        "sessionId": device_a.session_id,
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Device B logs in.
    let app = common::build_test_app(pool.clone());
    let device_b = login_user(app, "multi@test.com", &[]).await;

    // A revokes all other sessions.
    let auth = format!("Bearer {token_a}");
    let uri = format!("/api/v1/users/{}/sessions/revoke-others", device_a.user_id);
    let app = common::build_test_app(pool.clone());
    let response = common::request(
        app,
        Method::POST,
        &uri,
        Some(serde_json::json!({})),
        &[
            ("authorization", &auth),
            ("x-session-id", &device_a.session_id),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 1, "only B's session should be revoked");

    // B's refresh now fails...
    let body = serde_json::json!({
        "refreshSecret": device_b.refresh_secret,
        "sessionId": device_b.session_id,
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // ...while A's rotated secret still works.
    let body = serde_json::json!({
        "refreshSecret": secret_r1,
        "sessionId": device_a.session_id,
    });
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Bulk revocation is scoped to the authenticated principal.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_revoke_others_forbidden_for_other_user(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let alice = register_user(app, "alice3@test.com").await;
    let app = common::build_test_app(pool.clone());
    let mallory = register_user(app, "mallory3@test.com").await;

    let uri = format!("/api/v1/users/{}/sessions/revoke-others", alice.user_id);
    let app = common::build_test_app(pool);
    let response = common::post_json_auth(
        app,
        &uri,
        serde_json::json!({}),
        &mallory.access_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
