use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use quill_core::domain::{NewPost, Post, PostFilter, SortField, SortOrder};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository};

use crate::database::entity::post;
use crate::database::postgres_repo::PostgresPostRepository;

fn model(id: Uuid, title: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        title: title.to_owned(),
        content: "Content".to_owned(),
        author: "Ann".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model(post_id, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.author, "Ann");
    assert_eq!(post.id, post_id);
}

#[tokio::test]
async fn test_insert_returns_stored_post() {
    let post = Post::new(NewPost::new("Hello", "Content", "Ann").unwrap());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model(post.id, "Hello")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved = repo.insert(post.clone()).await.unwrap();

    assert_eq!(saved.id, post.id);
    assert_eq!(saved.title, "Hello");
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(matches!(
        repo.delete(Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_search_builds_case_insensitive_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            model(Uuid::new_v4(), "First"),
            model(Uuid::new_v4(), "Second"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db.clone());
    let filter = PostFilter {
        query: Some("Rust".to_string()),
        ..Default::default()
    };

    let posts = repo.search(&filter).await.unwrap();
    assert_eq!(posts.len(), 2);

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("LOWER"));
    assert!(log.contains("%rust%"));
    assert!(log.contains("ORDER BY"));
}

#[tokio::test]
async fn test_text_sort_orders_by_lowercased_column() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new(), Vec::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db.clone());
    let by_title = PostFilter {
        sort: SortField::Title,
        order: SortOrder::Asc,
        query: None,
    };
    repo.search(&by_title).await.unwrap();
    repo.search(&PostFilter::default()).await.unwrap();

    let log = db.into_transaction_log();
    assert_eq!(log.len(), 2);
    assert!(format!("{:?}", log[0]).contains("ORDER BY LOWER("));
    assert!(!format!("{:?}", log[1]).contains("LOWER("));
}
