//! Refresh signal for views that render the same posts elsewhere.

use std::sync::Arc;

use async_trait::async_trait;
use quill_core::ports::PubSub;

use crate::error::Operation;

/// Channel [`PubSubRefresh`] publishes on.
pub const REFRESH_CHANNEL: &str = "posts.refresh";

/// Tells other views of the post data that they should re-fetch.
///
/// Raised after every mutation, whether it succeeded or not.
#[async_trait]
pub trait RefreshSignal: Send + Sync {
    async fn refresh(&self, operation: Operation);
}

/// Refresh signal published on a pub/sub channel. The payload is the
/// operation name (`create`, `update` or `delete`).
pub struct PubSubRefresh {
    pubsub: Arc<dyn PubSub>,
    channel: String,
}

impl PubSubRefresh {
    pub fn new(pubsub: Arc<dyn PubSub>) -> Self {
        Self {
            pubsub,
            channel: REFRESH_CHANNEL.to_string(),
        }
    }
}

#[async_trait]
impl RefreshSignal for PubSubRefresh {
    async fn refresh(&self, operation: Operation) {
        if let Err(e) = self.pubsub.publish(&self.channel, operation.as_str()).await {
            tracing::warn!(channel = %self.channel, error = %e, "Failed to publish refresh signal");
        }
    }
}
