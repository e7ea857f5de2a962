use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the bookmark listing join: a bookmark projection plus at most
/// one tag name. Untagged bookmarks produce a single row with `tag = None`.
#[derive(FromQueryResult, Debug, Clone, PartialEq, Eq)]
pub struct BookmarkTagRow {
    pub id: i32,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tag: Option<String>,
}

/// A bookmark as returned to clients, with its tag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkWithTags {
    pub id: i32,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

impl BookmarkWithTags {
    fn from_row(row: BookmarkTagRow) -> (Self, Option<String>) {
        let bookmark = BookmarkWithTags {
            id: row.id,
            url: row.url,
            title: row.title,
            description: row.description,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            tags: Vec::new(),
        };
        (bookmark, row.tag)
    }
}

/// Folds flat join rows into bookmarks.
///
/// Bookmarks keep the order in which their id first appears, and each
/// bookmark's tags keep first-appearance order with duplicates dropped.
/// A `None` tag contributes nothing. Single pass, keyed by bookmark id.
pub fn collapse_bookmark_rows<I>(rows: I) -> Vec<BookmarkWithTags>
where
    I: IntoIterator<Item = BookmarkTagRow>,
{
    let mut bookmarks: Vec<BookmarkWithTags> = Vec::new();
    let mut index_by_id: HashMap<i32, usize> = HashMap::new();

    for row in rows {
        let position = match index_by_id.get(&row.id) {
            Some(&position) => {
                if let Some(tag) = row.tag {
                    push_distinct(&mut bookmarks[position].tags, tag);
                }
                continue;
            }
            None => bookmarks.len(),
        };

        let (mut bookmark, tag) = BookmarkWithTags::from_row(row);
        if let Some(tag) = tag {
            bookmark.tags.push(tag);
        }
        index_by_id.insert(bookmark.id, position);
        bookmarks.push(bookmark);
    }

    bookmarks
}

fn push_distinct(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::db::entities::user::Model> for PublicUser {
    fn from(user: crate::db::entities::user::Model) -> Self {
        PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
