//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::PostRepository;
use quill_infra::InMemoryPostRepository;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
}

impl AppState {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// State backed by process memory. Nothing survives a restart.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPostRepository::new()))
    }

    /// Connect to the configured database and bring its schema up to date.
    #[cfg(feature = "postgres")]
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        use migration::{Migrator, MigratorTrait};
        use quill_infra::PostgresPostRepository;
        use quill_infra::database::connect;

        let db = connect(&config.database).await?;

        if config.run_migrations {
            Migrator::up(&db, None).await?;
            tracing::info!("Database schema is up to date");
        }

        tracing::info!("Application state initialized");
        Ok(Self::new(Arc::new(PostgresPostRepository::new(db))))
    }

    #[cfg(not(feature = "postgres"))]
    pub async fn from_config(_config: &AppConfig) -> anyhow::Result<Self> {
        tracing::warn!("Running without postgres feature - posts are kept in memory");
        Ok(Self::in_memory())
    }
}
