//! Registration, login and bearer-token guard over the HTTP surface.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{TEST_SECRET, TestServer};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::json;

fn sign(claims: serde_json::Value, algorithm: Algorithm, secret: &str) -> String {
    encode(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let server = TestServer::new().await;
    let (status, _) = server.request("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_returns_public_user() {
    let server = TestServer::new().await;

    let (status, body) = server
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["id"].as_i64().is_some());
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = TestServer::new().await;
    server.signup("alice").await;

    let (status, body) = server
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "someone-else@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = server
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let server = TestServer::new().await;

    for payload in [
        json!({ "username": "al", "email": "al@example.com", "password": "password123" }),
        json!({ "username": "alice", "email": "not-an-email", "password": "password123" }),
        json!({ "username": "alice", "email": "alice@example.com", "password": "short" }),
    ] {
        let (status, body) = server
            .request("POST", "/api/auth/register", Some(payload.clone()), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload} should be rejected");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_malformed_auth_bodies_are_bad_requests() {
    let server = TestServer::new().await;

    for (uri, payload) in [
        ("/api/auth/register", json!({ "username": "alice", "email": 7, "password": "password123" })),
        ("/api/auth/login", json!({ "username": "alice" })),
    ] {
        let (status, body) = server.request("POST", uri, Some(payload), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Invalid JSON body");
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = TestServer::new().await;
    server.signup("alice").await;

    let (wrong_status, wrong_body) = server
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "not-the-password" })),
            None,
        )
        .await;
    let (unknown_status, unknown_body) = server
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "nobody", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_me_returns_authenticated_user() {
    let server = TestServer::new().await;
    let (user_id, token) = server.signup("alice").await;

    let (status, body) = server.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64(), Some(user_id));
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let server = TestServer::new().await;

    for uri in ["/api/auth/me", "/api/bookmarks", "/api/tags"] {
        let (status, body) = server.request("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} without token");
        assert!(body["error"].is_string());
    }

    let (status, _) = server
        .request("GET", "/api/bookmarks", None, Some("definitely-not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forged_and_expired_tokens_are_rejected() {
    let server = TestServer::new().await;
    let (user_id, _) = server.signup("alice").await;
    let sub = user_id.to_string();
    let future = (Utc::now() + Duration::hours(1)).timestamp();
    let past = (Utc::now() - Duration::hours(1)).timestamp();

    let rejected = [
        sign(json!({ "sub": sub, "exp": future }), Algorithm::HS256, "wrong-secret"),
        sign(json!({ "sub": sub, "exp": future }), Algorithm::HS384, TEST_SECRET),
        sign(json!({ "sub": sub, "exp": past }), Algorithm::HS256, TEST_SECRET),
        sign(json!({ "exp": future }), Algorithm::HS256, TEST_SECRET),
    ];
    for token in rejected {
        let (status, _) = server.request("GET", "/api/bookmarks", None, Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let accepted = sign(json!({ "sub": sub, "exp": future }), Algorithm::HS256, TEST_SECRET);
    let (status, _) = server
        .request("GET", "/api/bookmarks", None, Some(&accepted))
        .await;
    assert_eq!(status, StatusCode::OK);
}
