//! Sync layer error types.

use std::fmt;

use thiserror::Error;

/// The three mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Shown when the operation succeeds.
    pub fn success_message(&self) -> &'static str {
        match self {
            Operation::Create => "Post created successfully",
            Operation::Update => "Post updated successfully",
            Operation::Delete => "Post deleted successfully",
        }
    }

    /// Shown when the operation fails and the server gave no message.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Create => "Failed to create post",
            Operation::Update => "Failed to update post",
            Operation::Delete => "Failed to delete post",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors talking to the posts API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Server responded with status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Malformed(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Errors surfaced by [`PostSync`](crate::PostSync).
#[derive(Debug, Error)]
pub enum SyncError {
    /// A mutation failed and its optimistic change was rolled back.
    #[error("{message}")]
    MutationFailed {
        operation: Operation,
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to fetch posts")]
    Load(#[source] ApiError),

    #[error("Failed to fetch post")]
    Fetch(#[source] ApiError),
}

impl SyncError {
    /// Wrap an API failure, preferring the server's message over the generic one.
    pub fn mutation_failed(operation: Operation, source: ApiError) -> Self {
        let message = source
            .server_message()
            .map(str::to_owned)
            .unwrap_or_else(|| operation.failure_message().to_owned());
        SyncError::MutationFailed {
            operation,
            message,
            source,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins_over_fallback() {
        let err = SyncError::mutation_failed(
            Operation::Update,
            ApiError::Status {
                status: 404,
                message: Some("Post not found".to_string()),
            },
        );
        assert_eq!(err.to_string(), "Post not found");
    }

    #[test]
    fn test_fallback_message_without_server_message() {
        let transport = SyncError::mutation_failed(
            Operation::Delete,
            ApiError::Transport("connection refused".to_string()),
        );
        assert_eq!(transport.to_string(), "Failed to delete post");

        let bare_status = SyncError::mutation_failed(
            Operation::Create,
            ApiError::Status {
                status: 500,
                message: None,
            },
        );
        assert_eq!(bare_status.to_string(), "Failed to create post");
    }
}
