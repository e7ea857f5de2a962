use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::models::BookmarkWithTags;
use crate::db::services::{self, BookmarkListParams};
use crate::web::models::{AuthenticatedUser, BookmarkListQuery, BookmarkPayload};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn list_bookmarks_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<BookmarkListQuery>,
) -> Result<Json<Vec<BookmarkWithTags>>, AppError> {
    let params = BookmarkListParams::from_query(&query)?;
    let bookmarks =
        services::list_bookmarks(&app_state.db_pool, authenticated_user.id, &params).await?;
    Ok(Json(bookmarks))
}

async fn get_bookmark_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(bookmark_id): Path<i32>,
) -> Result<Json<BookmarkWithTags>, AppError> {
    services::get_bookmark(&app_state.db_pool, authenticated_user.id, bookmark_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Bookmark not found".to_string()))
}

async fn create_bookmark_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<BookmarkPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<BookmarkWithTags>), AppError> {
    let Json(payload) = payload?;
    let bookmark =
        services::create_bookmark(&app_state.db_pool, authenticated_user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

async fn update_bookmark_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(bookmark_id): Path<i32>,
    payload: Result<Json<BookmarkPayload>, JsonRejection>,
) -> Result<Json<BookmarkWithTags>, AppError> {
    let Json(payload) = payload?;
    let bookmark = services::update_bookmark(
        &app_state.db_pool,
        authenticated_user.id,
        bookmark_id,
        payload,
    )
    .await?;
    Ok(Json(bookmark))
}

async fn delete_bookmark_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(bookmark_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let rows_affected =
        services::delete_bookmark(&app_state.db_pool, authenticated_user.id, bookmark_id).await?;

    if rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Bookmark not found".to_string()))
    }
}

// --- Router ---

pub fn create_bookmarks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_bookmarks_handler).post(create_bookmark_handler))
        .route(
            "/{bookmark_id}",
            get(get_bookmark_handler)
                .put(update_bookmark_handler)
                .delete(delete_bookmark_handler),
        )
}
