//! Domain-level error types.

use thiserror::Error;

/// Business rule failures, raised before anything is stored.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} {id} does not exist")]
    NotFound { entity_type: &'static str, id: String },

    /// Carries the message shown to the user as is.
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Storage failures reported by repository adapters.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Storage unreachable: {0}")]
    Connection(String),

    #[error("Storage query failed: {0}")]
    Query(String),

    #[error("No such record")]
    NotFound,

    #[error("Constraint violated: {0}")]
    Constraint(String),
}
