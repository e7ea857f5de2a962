use serde::{Deserialize, Serialize};

use crate::db::models::PublicUser;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: String,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Decimal user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// Struct to hold authenticated user details, to be passed as a request extension.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: i32,
}

/// Body of `POST /api/bookmarks` and `PUT /api/bookmarks/{id}`.
///
/// On update, blank or missing text fields mean "leave unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkPayload {
    #[serde(default)]
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Raw query string of `GET /api/bookmarks`. Values are interpreted by
/// `BookmarkListParams::from_query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub tags: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}
