//! In-memory post repository - used when no database is configured, and in tests.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, PostFilter};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository};

/// In-memory post repository backed by a HashMap with an async RwLock.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&entity.id) {
            return Err(RepoError::Constraint("Post already exists".to_string()));
        }
        posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let slot = posts.get_mut(&entity.id).ok_or(RepoError::NotFound)?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut found: Vec<Post> = posts
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        found.sort_by(|a, b| filter.compare(a, b));
        Ok(found)
    }
}
