//! Shared harness for HTTP-level integration tests.
//!
//! Builds the real application router (same middleware stack as
//! production) over a `#[sqlx::test]`-provisioned pool and provides small
//! request helpers around `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use liftlog_api::auth::jwt::JwtConfig;
use liftlog_api::config::ServerConfig;
use liftlog_api::router::build_app_router;
use liftlog_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 365,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send one request through the router with the given method, optional
/// JSON body, and extra headers.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };

    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    request(app, Method::GET, uri, None, &[]).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let auth = format!("Bearer {token}");
    request(app, Method::GET, uri, None, &[("authorization", &auth)]).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::POST, uri, Some(body), &[]).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let auth = format!("Bearer {token}");
    request(
        app,
        Method::POST,
        uri,
        Some(body),
        &[("authorization", &auth)],
    )
    .await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let auth = format!("Bearer {token}");
    request(app, Method::DELETE, uri, None, &[("authorization", &auth)]).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// A logged-in identity as the client would hold it.
pub struct TestLogin {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_secret: String,
    pub session_id: String,
}

impl From<&serde_json::Value> for TestLogin {
    fn from(json: &serde_json::Value) -> Self {
        TestLogin {
            user_id: json["user"]["id"].as_i64().expect("user id"),
            access_token: json["accessToken"].as_str().expect("access token").to_string(),
            refresh_secret: json["refreshSecret"]
                .as_str()
                .expect("refresh secret")
                .to_string(),
            session_id: json["sessionId"].as_str().expect("session id").to_string(),
        }
    }
}

/// Register a user through the API and return the credential bundle.
pub async fn register_user(app: Router, email: &str) -> TestLogin {
    let body = serde_json::json!({
        "email": email,
        "password": "Str0ng!pass",
        "name": "Test Lifter",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(
        response.status(),
        axum::http::StatusCode::CREATED,
        "registration should succeed"
    );
    let json = body_json(response).await;
    TestLogin::from(&json)
}

/// Log an existing user in through the API, optionally with device headers.
pub async fn login_user(app: Router, email: &str, headers: &[(&str, &str)]) -> TestLogin {
    let body = serde_json::json!({ "email": email, "password": "Str0ng!pass" });
    let response = request(app, Method::POST, "/api/v1/auth/login", Some(body), headers).await;
    assert_eq!(
        response.status(),
        axum::http::StatusCode::OK,
        "login should succeed"
    );
    let json = body_json(response).await;
    TestLogin::from(&json)
}
