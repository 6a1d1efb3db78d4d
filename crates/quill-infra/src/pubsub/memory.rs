//! In-memory pub/sub implementation.
//!
//! Works within a single process only. Every subscription is a task that
//! owns a broadcast receiver and runs the handler for each message.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

use quill_core::ports::{MessageHandler, PubSub, PubSubError, PubSubMessage};

struct Channel {
    sender: broadcast::Sender<String>,
    subscribers: Vec<JoinHandle<()>>,
}

/// In-memory pub/sub system built on tokio broadcast channels.
pub struct InMemoryPubSub {
    channels: RwLock<HashMap<String, Channel>>,
    capacity: usize,
}

impl InMemoryPubSub {
    /// `capacity` is how many messages a slow subscriber may fall behind
    /// before it starts missing some.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Number of live subscriptions on `channel`.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |ch| ch.subscribers.iter().filter(|t| !t.is_finished()).count())
    }
}

impl Default for InMemoryPubSub {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Drop for InMemoryPubSub {
    fn drop(&mut self) {
        for channel in self.channels.get_mut().values() {
            channel.subscribers.iter().for_each(JoinHandle::abort);
        }
    }
}

async fn listen(
    channel: String,
    mut receiver: broadcast::Receiver<String>,
    handler: MessageHandler,
) {
    loop {
        match receiver.recv().await {
            Ok(payload) => {
                handler(PubSubMessage {
                    channel: channel.clone(),
                    payload,
                })
                .await;
            }
            Err(broadcast::error::RecvError::Lagged(count)) => {
                tracing::warn!(channel = %channel, lagged = count, "Subscriber lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[async_trait]
impl PubSub for InMemoryPubSub {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), PubSubError> {
        let channels = self.channels.read().await;

        match channels.get(channel).map(|ch| ch.sender.send(payload.to_string())) {
            Some(Ok(receivers)) => {
                tracing::debug!(channel = %channel, receivers, "Message published");
            }
            _ => tracing::debug!(channel = %channel, "No subscribers for channel"),
        }

        Ok(())
    }

    async fn subscribe(&self, channel: &str, handler: MessageHandler) -> Result<(), PubSubError> {
        let mut channels = self.channels.write().await;

        let entry = channels
            .entry(channel.to_string())
            .or_insert_with(|| Channel {
                sender: broadcast::channel(self.capacity).0,
                subscribers: Vec::new(),
            });
        entry.subscribers.retain(|task| !task.is_finished());

        let receiver = entry.sender.subscribe();
        entry
            .subscribers
            .push(tokio::spawn(listen(channel.to_string(), receiver, handler)));
        tracing::debug!(channel = %channel, "Subscribed to channel");

        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> Result<(), PubSubError> {
        if let Some(removed) = self.channels.write().await.remove(channel) {
            removed.subscribers.iter().for_each(JoinHandle::abort);
            tracing::debug!(
                channel = %channel,
                subscribers = removed.subscribers.len(),
                "Unsubscribed from channel"
            );
        }
        Ok(())
    }
}
