//! # Quill Sync
//!
//! Client-side synchronization layer for posts.
//!
//! Every mutation is applied to the local [`PostStore`] before the request
//! goes out, reconciled with the server's answer when it arrives, and rolled
//! back if the request fails. See [`PostSync`] for the operations and
//! [`Mutation`] for the underlying state machine.
//!
//! ```ignore
//! let api = Arc::new(HttpPostsApi::new("http://127.0.0.1:8080/api")?);
//! let sync = PostSync::new(api, PostStore::new(), Arc::new(TracingNotifier), refresh);
//!
//! sync.load(&PostFilter::default()).await?;
//! let post = sync.create(PostForm::new("Hello", "First post", "ann")).await?;
//! sync.delete(&post.id).await?;
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod mutation;
pub mod notify;
pub mod refresh;
pub mod store;
mod sync;

pub use api::{PostForm, PostsApi};
pub use error::{ApiError, Operation, SyncError, SyncResult};
pub use http::HttpPostsApi;
pub use mutation::{Mutation, MutationState, PendingMutation};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use refresh::{PubSubRefresh, REFRESH_CHANNEL, RefreshSignal};
pub use store::PostStore;
pub use sync::PostSync;
