//! Domain entities - the core business objects.

mod post;

pub use post::{
    AUTHOR_MAX_LEN, NewPost, Post, PostChanges, PostFilter, SortField, SortOrder, TITLE_MAX_LEN,
};
