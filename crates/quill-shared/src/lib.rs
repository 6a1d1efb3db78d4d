//! # Quill Shared
//!
//! Wire types shared between the API server and its clients.

pub mod dto;
pub mod response;

pub use dto::{CreatePostRequest, DeleteResponse, ListPostsQuery, PostRecord, UpdatePostRequest};
pub use response::ErrorResponse;
