//! The CRUD API as seen from the client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quill_core::domain::PostFilter;
use quill_shared::{CreatePostRequest, PostRecord, UpdatePostRequest};

use crate::error::ApiError;

/// Form data for a post: everything except the server-assigned fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl PostForm {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: author.into(),
        }
    }
}

impl From<PostForm> for CreatePostRequest {
    fn from(form: PostForm) -> Self {
        CreatePostRequest::new(form.title, form.content, form.author)
    }
}

impl From<PostForm> for UpdatePostRequest {
    fn from(form: PostForm) -> Self {
        UpdatePostRequest {
            title: Some(form.title),
            content: Some(form.content),
            author: Some(form.author),
        }
    }
}

/// Posts API client - abstraction over the HTTP transport so the sync layer
/// can be driven by a scripted implementation in tests.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// `GET /posts` with search text and ordering.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostRecord>, ApiError>;

    /// `GET /posts/{id}`. A 404 is `Ok(None)`.
    async fn get(&self, id: &str) -> Result<Option<PostRecord>, ApiError>;

    /// `POST /posts`.
    async fn create(&self, request: &CreatePostRequest) -> Result<PostRecord, ApiError>;

    /// `PUT /posts/{id}`.
    async fn update(&self, id: &str, request: &UpdatePostRequest)
    -> Result<PostRecord, ApiError>;

    /// `DELETE /posts/{id}`.
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}
