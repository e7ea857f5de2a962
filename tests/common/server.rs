//! Server test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bookmark_manager::db;
use bookmark_manager::server::config::{PartialServerConfig, ServerConfig};
use bookmark_manager::web::{AppState, create_axum_router};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// The real router over a throwaway SQLite file.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub db: DatabaseConnection,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("bookmarks.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let db = db::connect(&database_url, 1)
            .await
            .expect("Failed to open test database");

        let config = ServerConfig::merge(
            PartialServerConfig {
                jwt_secret: Some(TEST_SECRET.to_string()),
                database_url: Some(database_url),
                bcrypt_cost: Some(4),
                ..Default::default()
            },
            PartialServerConfig::default(),
        )
        .expect("Failed to build test config");

        let router = create_axum_router(AppState::new(db.clone(), Arc::new(config)));

        TestServer {
            router,
            db,
            _temp_dir: temp_dir,
        }
    }

    /// Registers a user and logs in, returning `(user_id, token)`.
    pub async fn signup(&self, username: &str) -> (i64, String) {
        let (status, _) = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "password123",
                })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration of {username} failed");

        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "username": username, "password": "password123" })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login of {username} failed");

        let user_id = body["user"]["id"].as_i64().expect("user id in login response");
        let token = body["token"].as_str().expect("token in login response").to_string();
        (user_id, token)
    }

    /// Creates a bookmark and returns the response body.
    pub async fn create_bookmark(&self, token: &str, body: Value) -> Value {
        let (status, body) = self
            .request("POST", "/api/bookmarks", Some(body), Some(token))
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected create response: {body}");
        body
    }

    /// Sends a JSON request and returns status plus parsed body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        auth_token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = auth_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}

/// Tag names of a bookmark JSON object.
#[allow(dead_code)]
pub fn tag_names(bookmark: &Value) -> Vec<String> {
    bookmark["tags"]
        .as_array()
        .expect("tags array")
        .iter()
        .map(|t| t.as_str().expect("tag name").to_string())
        .collect()
}

/// Ids of a bookmark listing, in response order.
#[allow(dead_code)]
pub fn ids(listing: &Value) -> Vec<i64> {
    listing
        .as_array()
        .expect("listing array")
        .iter()
        .map(|b| b["id"].as_i64().expect("bookmark id"))
        .collect()
}
