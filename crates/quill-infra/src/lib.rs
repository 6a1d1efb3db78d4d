//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL post storage via SeaORM
//!
//! Without `postgres` only the in-memory adapters are built. Workspace
//! members depend on this crate with default features off.

pub mod database;
pub mod pubsub;

pub use database::InMemoryPostRepository;
pub use pubsub::InMemoryPubSub;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresPostRepository};
