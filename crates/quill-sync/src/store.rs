//! The post collection shown to the user.

use std::sync::Arc;

use quill_shared::PostRecord;
use tokio::sync::watch;

/// Owned, shareable container for the displayed post collection.
///
/// Cloning a store yields another handle to the same collection. Views call
/// [`subscribe`](PostStore::subscribe) to be woken on every change.
#[derive(Clone)]
pub struct PostStore {
    tx: Arc<watch::Sender<Vec<PostRecord>>>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::with_posts(Vec::new())
    }

    pub fn with_posts(posts: Vec<PostRecord>) -> Self {
        let (tx, _rx) = watch::channel(posts);
        Self { tx: Arc::new(tx) }
    }

    /// A copy of the current collection.
    pub fn snapshot(&self) -> Vec<PostRecord> {
        self.tx.borrow().clone()
    }

    /// Replace the whole collection, e.g. after a reload.
    pub fn replace(&self, posts: Vec<PostRecord>) {
        self.tx.send_replace(posts);
    }

    /// Mutate the collection in place and notify subscribers.
    ///
    /// The closure runs with exclusive access, so everything it does is
    /// observed by other handles as a single change.
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<PostRecord>) -> R) -> R {
        let mut result = None;
        self.tx.send_modify(|posts| result = Some(f(posts)));
        result.expect("send_modify runs the closure exactly once")
    }

    /// Receiver that is marked changed whenever the collection changes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<PostRecord>> {
        self.tx.subscribe()
    }
}

impl Default for PostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PostStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostStore")
            .field("len", &self.tx.borrow().len())
            .finish()
    }
}
