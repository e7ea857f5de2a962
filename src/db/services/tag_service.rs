use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
};
use serde::Serialize;

use crate::db::entities::{bookmark_tag, tag};
use crate::db::services::bookmark_query::SqlArgs;

// --- Tag Service Functions ---

/// A tag together with the number of bookmarks carrying it.
#[derive(FromQueryResult, Serialize, Debug, Clone)]
pub struct TagWithCount {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub bookmark_count: i64,
}

/// Ensures every name exists as a tag of `user_id` and returns their ids.
///
/// Runs on whatever connection it is given, normally an open transaction.
/// Existing `(user_id, name)` pairs are left alone, then the whole name set is
/// read back so new and pre-existing tags resolve the same way. The returned
/// ids are not in input order. An empty name set issues no queries.
pub async fn upsert_tags<C>(conn: &C, user_id: i32, names: &[String]) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let now = Utc::now();
    let mut args = SqlArgs::new(conn.get_database_backend());
    let rows: Vec<String> = names
        .iter()
        .map(|name| {
            format!(
                "({}, {}, {})",
                args.bind(user_id),
                args.bind(name.clone()),
                args.bind(now)
            )
        })
        .collect();
    let sql = format!(
        "INSERT INTO tags (user_id, name, created_at) VALUES {} ON CONFLICT (user_id, name) DO NOTHING",
        rows.join(", ")
    );
    conn.execute(args.into_statement(sql)).await?;

    tag::Entity::find()
        .select_only()
        .column(tag::Column::Id)
        .filter(tag::Column::UserId.eq(user_id))
        .filter(tag::Column::Name.is_in(names.iter().cloned()))
        .into_tuple::<i32>()
        .all(conn)
        .await
}

/// Links a bookmark to each tag id. Existing links are ignored.
pub async fn link_tags_to_bookmark<C>(conn: &C, bookmark_id: i32, tag_ids: &[i32]) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    if tag_ids.is_empty() {
        return Ok(0);
    }

    let mut args = SqlArgs::new(conn.get_database_backend());
    let rows: Vec<String> = tag_ids
        .iter()
        .map(|tag_id| format!("({}, {})", args.bind(bookmark_id), args.bind(*tag_id)))
        .collect();
    let sql = format!(
        "INSERT INTO bookmark_tags (bookmark_id, tag_id) VALUES {} ON CONFLICT (bookmark_id, tag_id) DO NOTHING",
        rows.join(", ")
    );
    let result = conn.execute(args.into_statement(sql)).await?;
    Ok(result.rows_affected())
}

/// Removes every tag link of a bookmark.
pub async fn unlink_all_tags<C>(conn: &C, bookmark_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = bookmark_tag::Entity::delete_many()
        .filter(bookmark_tag::Column::BookmarkId.eq(bookmark_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Replaces a bookmark's tag links with exactly `tag_ids`. An empty slice
/// leaves the bookmark untagged.
pub async fn sync_bookmark_tags<C>(conn: &C, bookmark_id: i32, tag_ids: &[i32]) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    unlink_all_tags(conn, bookmark_id).await?;
    link_tags_to_bookmark(conn, bookmark_id, tag_ids).await
}

/// Retrieves all tags for a user, including a count of how many bookmarks use each tag.
pub async fn get_tags_by_user_id_with_count<C>(conn: &C, user_id: i32) -> Result<Vec<TagWithCount>, DbErr>
where
    C: ConnectionTrait,
{
    let mut args = SqlArgs::new(conn.get_database_backend());
    let sql = format!(
        r#"
        SELECT t.id, t.name, t.created_at, COUNT(bt.bookmark_id) AS bookmark_count
        FROM tags t
        LEFT JOIN bookmark_tags bt ON t.id = bt.tag_id
        WHERE t.user_id = {}
        GROUP BY t.id, t.name, t.created_at
        ORDER BY t.name
        "#,
        args.bind(user_id)
    );
    TagWithCount::find_by_statement(args.into_statement(sql))
        .all(conn)
        .await
}

/// Deletes a tag. The ON DELETE CASCADE in the DB will handle bookmark_tags entries.
pub async fn delete_tag<C>(conn: &C, tag_id: i32, user_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = tag::Entity::delete_many()
        .filter(tag::Column::Id.eq(tag_id))
        .filter(tag::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
