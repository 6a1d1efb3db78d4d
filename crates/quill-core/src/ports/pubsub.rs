//! Pub/Sub port - fan-out of short text messages between components.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

/// Message received from a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubSubMessage {
    pub channel: String,
    pub payload: String,
}

type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Callback run for every message on a subscribed channel.
pub type MessageHandler = Box<dyn Fn(PubSubMessage) -> HandlerFuture + Send + Sync>;

/// Box an async closure as a [`MessageHandler`].
pub fn handler<F, Fut>(f: F) -> MessageHandler
where
    F: Fn(PubSubMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move |msg| Box::pin(f(msg)))
}

#[async_trait]
pub trait PubSub: Send + Sync {
    /// Deliver `payload` to every current subscriber of `channel`.
    ///
    /// Publishing on a channel nobody listens to is not an error.
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), PubSubError>;

    /// Run `handler` for each message published on `channel` from now on.
    async fn subscribe(&self, channel: &str, handler: MessageHandler) -> Result<(), PubSubError>;

    /// Stop every handler on `channel`. Undelivered messages are dropped.
    async fn unsubscribe(&self, channel: &str) -> Result<(), PubSubError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PubSubError {
    #[error("Failed to publish on {channel}: {reason}")]
    Publish { channel: String, reason: String },

    #[error("Failed to subscribe to {channel}: {reason}")]
    Subscribe { channel: String, reason: String },
}
