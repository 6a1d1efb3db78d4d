//! HTTP implementation of [`PostsApi`] using reqwest.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use quill_core::domain::PostFilter;
use quill_shared::{
    CreatePostRequest, DeleteResponse, ErrorResponse, ListPostsQuery, PostRecord,
    UpdatePostRequest,
};

use crate::api::PostsApi;
use crate::error::ApiError;

/// Posts API client over HTTP.
///
/// `base_url` points at the API root, e.g. `http://127.0.0.1:8080/api`;
/// requests go to `{base_url}/posts[/{id}]`.
#[derive(Debug, Clone)]
pub struct HttpPostsApi {
    base_url: Url,
    client: Client,
}

impl HttpPostsApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!(
                "invalid base URL {base_url}: cannot be a base"
            )));
        }
        Ok(Self { base_url, client })
    }

    /// `{base_url}/posts` followed by the given path segments.
    fn posts_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("posts").extend(segments);
        }
        url
    }
}

/// Turn a non-2xx response into `ApiError::Status`, keeping the server's message.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(|body| body.message().map(str::to_owned));

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ApiError::Malformed(e.to_string()))
}

#[async_trait]
impl PostsApi for HttpPostsApi {
    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostRecord>, ApiError> {
        let params = ListPostsQuery {
            query: filter.search_text().map(str::to_owned),
            sort: Some(filter.sort.as_str().to_string()),
            order: Some(filter.order.as_str().to_string()),
        };

        let response = self
            .client
            .get(self.posts_url(&[]))
            .query(&params)
            .send()
            .await?;
        read_json(response).await
    }

    async fn get(&self, id: &str) -> Result<Option<PostRecord>, ApiError> {
        let response = self.client.get(self.posts_url(&[id])).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    async fn create(&self, request: &CreatePostRequest) -> Result<PostRecord, ApiError> {
        let response = self
            .client
            .post(self.posts_url(&[]))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update(
        &self,
        id: &str,
        request: &UpdatePostRequest,
    ) -> Result<PostRecord, ApiError> {
        let response = self
            .client
            .put(self.posts_url(&[id]))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let response = self.client.delete(self.posts_url(&[id])).send().await?;
        let ack: DeleteResponse = read_json(response).await?;
        if !ack.success {
            return Err(ApiError::Malformed("deletion was not acknowledged".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_url_joins_segments() {
        let api = HttpPostsApi::new("http://localhost:8080/api/").unwrap();
        assert_eq!(
            api.posts_url(&[]).as_str(),
            "http://localhost:8080/api/posts"
        );
        assert_eq!(
            api.posts_url(&["abc"]).as_str(),
            "http://localhost:8080/api/posts/abc"
        );
    }

    #[test]
    fn test_posts_url_escapes_ids() {
        let api = HttpPostsApi::new("http://localhost:8080/api").unwrap();
        assert_eq!(
            api.posts_url(&["a/b"]).as_str(),
            "http://localhost:8080/api/posts/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpPostsApi::new("not a url").is_err());
        assert!(HttpPostsApi::new("mailto:someone@example.com").is_err());
    }
}
