//! Tag upsert and linking against a real database connection.

mod common;

use bookmark_manager::db::entities::{bookmark_tag, prelude::*, tag};
use bookmark_manager::db::services::{self, BookmarkListParams};
use bookmark_manager::web::models::BookmarkPayload;
use common::TestServer;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait};

fn names(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|n| n.to_string()).collect()
}

async fn new_user(server: &TestServer, username: &str) -> i32 {
    services::create_user(&server.db, username, &format!("{username}@example.com"), "hash")
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let server = TestServer::new().await;
    let user_id = new_user(&server, "alice").await;

    let mut first = services::upsert_tags(&server.db, user_id, &names(&["go", "cli"]))
        .await
        .unwrap();
    let mut second = services::upsert_tags(&server.db, user_id, &names(&["cli", "go"]))
        .await
        .unwrap();
    first.sort();
    second.sort();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(
        Tag::find()
            .filter(tag::Column::UserId.eq(user_id))
            .count(&server.db)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_upsert_resolves_mixed_new_and_existing() {
    let server = TestServer::new().await;
    let user_id = new_user(&server, "alice").await;

    let existing = services::upsert_tags(&server.db, user_id, &names(&["go"]))
        .await
        .unwrap();
    let resolved = services::upsert_tags(&server.db, user_id, &names(&["go", "rust"]))
        .await
        .unwrap();

    assert_eq!(resolved.len(), 2);
    assert!(resolved.contains(&existing[0]));
}

#[tokio::test]
async fn test_upsert_of_nothing_is_a_no_op() {
    let server = TestServer::new().await;
    let user_id = new_user(&server, "alice").await;

    assert!(services::upsert_tags(&server.db, user_id, &[]).await.unwrap().is_empty());
    assert_eq!(Tag::find().count(&server.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_tags_are_scoped_per_user() {
    let server = TestServer::new().await;
    let alice = new_user(&server, "alice").await;
    let bob = new_user(&server, "bob").await;

    let alice_ids = services::upsert_tags(&server.db, alice, &names(&["go"])).await.unwrap();
    let bob_ids = services::upsert_tags(&server.db, bob, &names(&["go"])).await.unwrap();

    assert_ne!(alice_ids, bob_ids);
    assert_eq!(Tag::find().count(&server.db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_sync_inside_dropped_transaction_is_discarded() {
    let server = TestServer::new().await;
    let user_id = new_user(&server, "alice").await;
    let created = services::create_bookmark(
        &server.db,
        user_id,
        BookmarkPayload {
            url: "https://example.com".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    {
        let txn = server.db.begin().await.unwrap();
        let tag_ids = services::upsert_tags(&txn, user_id, &names(&["draft"])).await.unwrap();
        services::sync_bookmark_tags(&txn, created.id, &tag_ids).await.unwrap();
        assert_eq!(BookmarkTag::find().count(&txn).await.unwrap(), 1);
        // Dropped without commit.
    }

    assert_eq!(Tag::find().count(&server.db).await.unwrap(), 0);
    assert_eq!(BookmarkTag::find().count(&server.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_sync_replaces_links_and_relinking_is_harmless() {
    let server = TestServer::new().await;
    let user_id = new_user(&server, "alice").await;
    let created = services::create_bookmark(
        &server.db,
        user_id,
        BookmarkPayload {
            url: "https://example.com".to_string(),
            tags: names(&["old"]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let txn = server.db.begin().await.unwrap();
    let tag_ids = services::upsert_tags(&txn, user_id, &names(&["a", "b"])).await.unwrap();
    assert_eq!(
        services::sync_bookmark_tags(&txn, created.id, &tag_ids).await.unwrap(),
        2
    );
    assert_eq!(
        services::link_tags_to_bookmark(&txn, created.id, &tag_ids).await.unwrap(),
        0
    );
    txn.commit().await.unwrap();

    let links = BookmarkTag::find()
        .filter(bookmark_tag::Column::BookmarkId.eq(created.id))
        .count(&server.db)
        .await
        .unwrap();
    assert_eq!(links, 2);

    let listed = services::list_bookmarks(&server.db, user_id, &BookmarkListParams::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    let mut tags = listed[0].tags.clone();
    tags.sort();
    assert_eq!(tags, vec!["a", "b"]);

    assert_eq!(services::sync_bookmark_tags(&server.db, created.id, &[]).await.unwrap(), 0);
    assert_eq!(services::unlink_all_tags(&server.db, created.id).await.unwrap(), 0);
}
