//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod pubsub;
mod repository;

pub use pubsub::{MessageHandler, PubSub, PubSubError, PubSubMessage, handler};
pub use repository::{BaseRepository, PostRepository};
