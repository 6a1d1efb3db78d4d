use std::sync::Arc;

use quill_core::domain::PostFilter;
use quill_shared::{PostRecord, UpdatePostRequest};

use crate::api::{PostForm, PostsApi};
use crate::error::{ApiError, Operation, SyncError, SyncResult};
use crate::mutation::Mutation;
use crate::notify::{Notification, Notifier};
use crate::refresh::RefreshSignal;
use crate::store::PostStore;

/// Optimistic create/update/delete of posts against the API.
///
/// Each mutation is applied to the store immediately, then reconciled with
/// the server's response or rolled back if the request fails. Either way
/// the user is notified and the refresh signal is raised. Failures are
/// returned to the caller after rollback.
///
/// Operations take `&self` and may be interleaved. There is no locking per
/// post: if two mutations of the same post are in flight, whichever response
/// arrives last decides the local state.
pub struct PostSync {
    api: Arc<dyn PostsApi>,
    store: PostStore,
    notifier: Arc<dyn Notifier>,
    refresh: Arc<dyn RefreshSignal>,
}

impl PostSync {
    pub fn new(
        api: Arc<dyn PostsApi>,
        store: PostStore,
        notifier: Arc<dyn Notifier>,
        refresh: Arc<dyn RefreshSignal>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            refresh,
        }
    }

    /// The collection this instance mutates.
    pub fn store(&self) -> &PostStore {
        &self.store
    }

    /// Replace the collection with a fresh listing from the server.
    pub async fn load(&self, filter: &PostFilter) -> SyncResult<()> {
        let posts = self.api.list(filter).await.map_err(SyncError::Load)?;
        tracing::debug!(count = posts.len(), query = ?filter.search_text(), "Posts loaded");
        self.store.replace(posts);
        Ok(())
    }

    /// Fetch a single post without touching the collection.
    pub async fn fetch(&self, id: &str) -> SyncResult<Option<PostRecord>> {
        self.api.get(id).await.map_err(SyncError::Fetch)
    }

    /// Create a post, showing it at the top of the collection right away.
    pub async fn create(&self, form: PostForm) -> SyncResult<PostRecord> {
        let mutation = self.store.update(|posts| Mutation::create(posts, &form));
        tracing::debug!(temp_id = ?mutation.temp_id(), "Optimistic create applied");

        let result = self.api.create(&form.into()).await;
        self.settle(Operation::Create, mutation, result, |record| {
            Some(record.clone())
        })
        .await
    }

    /// Update a post in place. Absent fields in `changes` are left as they are.
    ///
    /// A post that is not in the collection is still sent to the server;
    /// only the local side is skipped.
    pub async fn update(
        &self,
        id: &str,
        changes: impl Into<UpdatePostRequest>,
    ) -> SyncResult<PostRecord> {
        let changes = changes.into();
        let mutation = self.store.update(|posts| Mutation::update(posts, id, &changes));
        tracing::debug!(post_id = %id, "Optimistic update applied");

        let result = self.api.update(id, &changes).await;
        self.settle(Operation::Update, mutation, result, |record| {
            Some(record.clone())
        })
        .await
    }

    /// Delete a post, removing it from the collection right away.
    pub async fn delete(&self, id: &str) -> SyncResult<()> {
        let mutation = self.store.update(|posts| Mutation::delete(posts, id));
        tracing::debug!(post_id = %id, "Optimistic delete applied");

        let result = self.api.delete(id).await;
        self.settle(Operation::Delete, mutation, result, |_| None)
            .await
    }

    /// Confirm or roll back, notify, and raise the refresh signal.
    async fn settle<T>(
        &self,
        operation: Operation,
        mut mutation: Mutation,
        result: Result<T, ApiError>,
        authoritative: impl FnOnce(&T) -> Option<PostRecord>,
    ) -> SyncResult<T> {
        let outcome = match result {
            Ok(value) => {
                let record = authoritative(&value);
                self.store
                    .update(|posts| mutation.confirm(posts, record));
                tracing::info!(operation = %operation, "Mutation confirmed");
                self.notifier
                    .notify(Notification::success(operation.success_message()));
                Ok(value)
            }
            Err(source) => {
                self.store.update(|posts| mutation.roll_back(posts));
                let error = SyncError::mutation_failed(operation, source);
                tracing::warn!(operation = %operation, error = %error, "Mutation rolled back");
                self.notifier.notify(Notification::error(error.to_string()));
                Err(error)
            }
        };

        self.refresh.refresh(operation).await;
        outcome
    }
}
