//! Post handlers.

use std::str::FromStr;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{NewPost, Post, PostChanges, PostFilter};
use quill_core::error::{DomainError, RepoError};
use quill_shared::{
    CreatePostRequest, DeleteResponse, ListPostsQuery, PostRecord, UpdatePostRequest,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_record(post: Post) -> PostRecord {
    PostRecord {
        id: post.id.to_string(),
        title: post.title,
        content: post.content,
        author: post.author,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// Ids are UUIDs; anything else cannot name a post.
fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::post_not_found())
}

fn not_found(id: Uuid) -> DomainError {
    DomainError::NotFound {
        entity_type: "Post",
        id: id.to_string(),
    }
}

/// Unrecognized values fall back to the default rather than failing the listing.
fn parse_or_default<T: FromStr + Default>(param: &'static str, value: Option<&str>) -> T {
    value
        .and_then(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                tracing::debug!(param, value, "Unrecognized listing parameter, using default");
            }
            parsed
        })
        .unwrap_or_default()
}

fn parse_filter(query: ListPostsQuery) -> PostFilter {
    PostFilter {
        sort: parse_or_default("sort", query.sort.as_deref()),
        order: parse_or_default("order", query.order.as_deref()),
        query: query.query,
    }
}

/// GET /api/posts?query=&sort=&order=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let filter = parse_filter(query.into_inner());
    let posts = state
        .posts
        .search(&filter)
        .await
        .map_err(|e| AppError::from(e).or_internal("Failed to fetch posts"))?;

    tracing::debug!(
        count = posts.len(),
        sort = %filter.sort,
        order = %filter.order,
        "Posts listed"
    );

    let records: Vec<PostRecord> = posts.into_iter().map(to_record).collect();
    Ok(HttpResponse::Ok().json(records))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let post = state
        .posts
        .find_by_id(id)
        .await
        .map_err(|e| AppError::from(e).or_internal("Failed to fetch post"))?
        .ok_or_else(|| not_found(id))?;

    Ok(HttpResponse::Ok().json(to_record(post)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let present = |field: Option<String>| field.filter(|value| !value.is_empty());
    let (Some(title), Some(content), Some(author)) =
        (present(req.title), present(req.content), present(req.author))
    else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    let post = Post::new(NewPost::new(title, content, author)?);
    let saved = state
        .posts
        .insert(post)
        .await
        .map_err(|e| AppError::from(e).or_internal("Failed to create post"))?;
    tracing::info!(post_id = %saved.id, "Post created");

    Ok(HttpResponse::Created().json(to_record(saved)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let req = body.into_inner();
    let changes = PostChanges::new(req.title, req.content, req.author)?;
    if changes.is_empty() {
        tracing::debug!(post_id = %id, "Update carries no field changes");
    }

    let failed = |e: RepoError| AppError::from(e).or_internal("Failed to update post");
    let mut post = state
        .posts
        .find_by_id(id)
        .await
        .map_err(failed)?
        .ok_or_else(|| not_found(id))?;
    post.apply(changes);
    let saved = state.posts.update(post).await.map_err(failed)?;
    tracing::info!(post_id = %saved.id, "Post updated");

    Ok(HttpResponse::Ok().json(to_record(saved)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state
        .posts
        .delete(id)
        .await
        .map_err(|e| AppError::from(e).or_internal("Failed to delete post"))?;
    tracing::info!(post_id = %id, "Post deleted");

    Ok(HttpResponse::Ok().json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use quill_core::domain::{SortField, SortOrder};
    use quill_shared::ErrorResponse;
    use serde_json::json;

    use super::*;
    use crate::handlers::configure_routes;

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    async fn seed(state: &AppState, title: &str, content: &str, author: &str) -> Post {
        let post = Post::new(NewPost::new(title, content, author).unwrap());
        state.posts.insert(post).await.unwrap()
    }

    #[actix_web::test]
    async fn test_create_returns_created_record() {
        let state = AppState::in_memory();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({"title": "Hello", "content": "First post", "author": "ann"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let record: PostRecord = test::read_body_json(resp).await;
        assert_eq!(record.title, "Hello");
        assert_eq!(record.created_at, record.updated_at);
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[actix_web::test]
    async fn test_create_rejects_missing_fields() {
        let state = AppState::in_memory();
        let app = app!(state);

        for body in [
            json!({"title": "Hello", "content": "First post"}),
            json!({"title": "", "content": "First post", "author": "ann"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/posts")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let err: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(err.message(), Some("Missing required fields"));
        }
    }

    #[actix_web::test]
    async fn test_create_rejects_long_title() {
        let state = AppState::in_memory();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({"title": "t".repeat(101), "content": "body", "author": "ann"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let err: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(err.message(), Some("Title cannot be more than 100 characters"));
    }

    #[actix_web::test]
    async fn test_list_searches_and_sorts() {
        let state = AppState::in_memory();
        seed(&state, "Rust tips", "ownership", "ann").await;
        seed(&state, "Cooking", "pasta with RUST-coloured sauce", "bob").await;
        seed(&state, "Gardening", "tomatoes", "cy").await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/api/posts?query=rust&sort=title&order=asc")
            .to_request();
        let records: Vec<PostRecord> = test::call_and_read_body_json(&app, req).await;
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Cooking", "Rust tips"]);

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let records: Vec<PostRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records.len(), 3);
    }

    #[actix_web::test]
    async fn test_list_falls_back_on_unrecognized_ordering() {
        let state = AppState::in_memory();
        for (title, minutes_ago) in [("Older", 10), ("Newer", 1)] {
            let mut post = Post::new(NewPost::new(title, "body", "ann").unwrap());
            post.created_at = chrono::Utc::now() - chrono::Duration::minutes(minutes_ago);
            post.updated_at = post.created_at;
            state.posts.insert(post).await.unwrap();
        }
        let app = app!(state);

        for uri in [
            "/api/posts?order=ASC",
            "/api/posts?sort=_id",
            "/api/posts?order=descending",
            "/api/posts?sort=content&order=up",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");

            let records: Vec<PostRecord> = test::read_body_json(resp).await;
            let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
            assert_eq!(titles, ["Newer", "Older"], "{uri}");
        }
    }

    #[::core::prelude::v1::test]
    fn test_parse_filter_keeps_recognized_values() {
        let filter = parse_filter(ListPostsQuery {
            query: Some("rust".to_string()),
            sort: Some("title".to_string()),
            order: Some("asc".to_string()),
        });
        assert_eq!(filter.sort, SortField::Title);
        assert_eq!(filter.order, SortOrder::Asc);
        assert_eq!(filter.search_text(), Some("rust"));

        let filter = parse_filter(ListPostsQuery {
            sort: Some("views".to_string()),
            order: Some("ASC".to_string()),
            ..Default::default()
        });
        assert_eq!(filter.sort, SortField::CreatedAt);
        assert_eq!(filter.order, SortOrder::Desc);
    }


    #[actix_web::test]
    async fn test_get_unknown_and_malformed_ids_are_not_found() {
        let state = AppState::in_memory();
        let app = app!(state);

        for uri in [
            format!("/api/posts/{}", Uuid::new_v4()),
            "/api/posts/not-a-uuid".to_string(),
        ] {
            let req = test::TestRequest::get().uri(&uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);

            let err: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(err.message(), Some("Post not found"));
        }
    }

    #[actix_web::test]
    async fn test_update_changes_only_given_fields() {
        let state = AppState::in_memory();
        let post = seed(&state, "Hello", "First post", "ann").await;
        let app = app!(state);

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", post.id))
            .set_json(json!({"title": "Hello again"}))
            .to_request();
        let record: PostRecord = test::call_and_read_body_json(&app, req).await;

        assert_eq!(record.id, post.id.to_string());
        assert_eq!(record.title, "Hello again");
        assert_eq!(record.content, "First post");
        assert_eq!(record.created_at, post.created_at);
        assert!(record.updated_at >= post.updated_at);
    }

    #[actix_web::test]
    async fn test_update_validates_and_reports_missing_post() {
        let state = AppState::in_memory();
        let post = seed(&state, "Hello", "First post", "ann").await;
        let app = app!(state);

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", post.id))
            .set_json(json!({"author": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", Uuid::new_v4()))
            .set_json(json!({"title": "Nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_acknowledges_then_not_found() {
        let state = AppState::in_memory();
        let post = seed(&state, "Hello", "First post", "ann").await;
        let app = app!(state);
        let uri = format!("/api/posts/{}", post.id);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let ack: DeleteResponse = test::call_and_read_body_json(&app, req).await;
        assert!(ack.success);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let state = AppState::in_memory();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_health() {
        let state = AppState::in_memory();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }
}
