use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use std::sync::Arc;

use crate::db::services::{self, TagWithCount};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn get_user_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagWithCount>>, AppError> {
    let tags =
        services::get_tags_by_user_id_with_count(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(tags))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let rows_affected =
        services::delete_tag(&app_state.db_pool, tag_id, authenticated_user.id).await?;

    if rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Tag not found".to_string()))
    }
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_user_tags_handler))
        .route("/{tag_id}", delete(delete_tag_handler))
}
