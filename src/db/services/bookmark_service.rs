//! Bookmark reads and the transactional bookmark/tag mutations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, QueryFilter, Set, TransactionTrait,
};
use tracing::{info, warn};

use crate::db::entities::bookmark;
use crate::db::models::{BookmarkTagRow, BookmarkWithTags, collapse_bookmark_rows};
use crate::db::services::bookmark_query::{
    BookmarkListParams, build_list_statement, build_single_statement, normalize_tag_names,
};
use crate::db::services::tag_service;
use crate::web::error::AppError;
use crate::web::models::BookmarkPayload;

/// Last step a bookmark mutation got through. Logged when a transaction is
/// rolled back so the failing step is visible.
///
/// Create and update both advance in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStage {
    Pending,
    TagsUpserted,
    BookmarkWritten,
    LinksRewritten,
    Committed,
}

pub async fn list_bookmarks<C>(
    conn: &C,
    user_id: i32,
    params: &BookmarkListParams,
) -> Result<Vec<BookmarkWithTags>, DbErr>
where
    C: ConnectionTrait,
{
    let statement = build_list_statement(conn.get_database_backend(), user_id, params);
    let rows = BookmarkTagRow::find_by_statement(statement).all(conn).await?;
    Ok(collapse_bookmark_rows(rows))
}

pub async fn get_bookmark<C>(
    conn: &C,
    user_id: i32,
    bookmark_id: i32,
) -> Result<Option<BookmarkWithTags>, DbErr>
where
    C: ConnectionTrait,
{
    let statement = build_single_statement(conn.get_database_backend(), user_id, bookmark_id);
    let rows = BookmarkTagRow::find_by_statement(statement).all(conn).await?;
    Ok(collapse_bookmark_rows(rows).into_iter().next())
}

/// Creates a bookmark and its tag links in one transaction.
pub async fn create_bookmark(
    db: &DatabaseConnection,
    user_id: i32,
    payload: BookmarkPayload,
) -> Result<BookmarkWithTags, AppError> {
    let BookmarkPayload {
        url,
        title,
        description,
        notes,
        tags,
    } = payload;
    let url = validate_url(&url)?;
    let tag_names = normalize_tag_names(&tags);

    let txn = db.begin().await?;
    let mut stage = MutationStage::Pending;

    let outcome: Result<i32, AppError> = async {
        let tag_ids = tag_service::upsert_tags(&txn, user_id, &tag_names).await?;
        stage = MutationStage::TagsUpserted;

        let now = Utc::now();
        let saved = bookmark::ActiveModel {
            user_id: Set(user_id),
            url: Set(url),
            title: Set(non_blank(title)),
            description: Set(non_blank(description)),
            notes: Set(non_blank(notes)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        stage = MutationStage::BookmarkWritten;

        tag_service::sync_bookmark_tags(&txn, saved.id, &tag_ids).await?;
        stage = MutationStage::LinksRewritten;

        Ok::<i32, AppError>(saved.id)
    }
    .await;

    let bookmark_id = finish(txn, &mut stage, outcome).await?;
    info!(user_id, bookmark_id, tags = tag_names.len(), "Bookmark created.");

    load_written(db, user_id, bookmark_id).await
}

/// Partially updates a bookmark and rewrites its tag links.
///
/// Blank or missing `url`, `title`, `description` and `notes` keep the stored
/// value, so a field cannot be cleared through this call. The tag set is
/// always replaced; an empty set removes every link.
pub async fn update_bookmark(
    db: &DatabaseConnection,
    user_id: i32,
    bookmark_id: i32,
    payload: BookmarkPayload,
) -> Result<BookmarkWithTags, AppError> {
    let BookmarkPayload {
        url,
        title,
        description,
        notes,
        tags,
    } = payload;
    let tag_names = normalize_tag_names(&tags);

    let txn = db.begin().await?;
    let mut stage = MutationStage::Pending;

    let outcome: Result<i32, AppError> = async {
        let existing = bookmark::Entity::find_by_id(bookmark_id)
            .filter(bookmark::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Bookmark not found".to_string()))?;

        let new_url = match non_blank(Some(url)) {
            Some(raw) => Some(validate_url(&raw)?),
            None => None,
        };

        let tag_ids = tag_service::upsert_tags(&txn, user_id, &tag_names).await?;
        stage = MutationStage::TagsUpserted;

        let mut active_model = existing.into_active_model();
        if let Some(url) = new_url {
            active_model.url = Set(url);
        }
        if let Some(title) = non_blank(title) {
            active_model.title = Set(Some(title));
        }
        if let Some(description) = non_blank(description) {
            active_model.description = Set(Some(description));
        }
        if let Some(notes) = non_blank(notes) {
            active_model.notes = Set(Some(notes));
        }
        active_model.updated_at = Set(Utc::now());
        active_model.update(&txn).await?;
        stage = MutationStage::BookmarkWritten;

        tag_service::sync_bookmark_tags(&txn, bookmark_id, &tag_ids).await?;
        stage = MutationStage::LinksRewritten;

        Ok::<i32, AppError>(bookmark_id)
    }
    .await;

    finish(txn, &mut stage, outcome).await?;
    info!(user_id, bookmark_id, tags = tag_names.len(), "Bookmark updated.");

    load_written(db, user_id, bookmark_id).await
}

/// Deletes a bookmark owned by the user. Its tag links go with it through
/// the cascading foreign key.
pub async fn delete_bookmark<C>(conn: &C, user_id: i32, bookmark_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = bookmark::Entity::delete_many()
        .filter(bookmark::Column::Id.eq(bookmark_id))
        .filter(bookmark::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

async fn finish<T>(
    txn: DatabaseTransaction,
    stage: &mut MutationStage,
    outcome: Result<T, AppError>,
) -> Result<T, AppError> {
    match outcome {
        Ok(value) => {
            txn.commit().await?;
            *stage = MutationStage::Committed;
            Ok(value)
        }
        Err(e) => {
            warn!(stage = ?stage, error = %e, "Bookmark mutation rolled back.");
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Explicit rollback failed; connection will discard the transaction.");
            }
            Err(e)
        }
    }
}

async fn load_written(
    db: &DatabaseConnection,
    user_id: i32,
    bookmark_id: i32,
) -> Result<BookmarkWithTags, AppError> {
    get_bookmark(db, user_id, bookmark_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bookmark not found".to_string()))
}

/// Accepts only well-formed absolute URLs. Returns the trimmed value.
pub fn validate_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("url is required".to_string()));
    }
    url::Url::parse(trimmed).map_err(|e| AppError::InvalidInput(format!("Invalid URL: {e}")))?;
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
