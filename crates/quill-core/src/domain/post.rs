use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Maximum number of characters in a post title.
pub const TITLE_MAX_LEN: usize = 100;

/// Maximum number of characters in an author name.
pub const AUTHOR_MAX_LEN: usize = 50;

/// Post entity - a short text post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with a generated ID and timestamps.
    pub fn new(new_post: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new_post.title,
            content: new_post.content,
            author: new_post.author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply validated changes and bump `updated_at`.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(author) = changes.author {
            self.author = author;
        }
        self.updated_at = Utc::now();
    }
}

/// A validated payload for creating a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    title: String,
    content: String,
    author: String,
}

impl NewPost {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let (title, content, author) = (title.into(), content.into(), author.into());
        validate_title(&title)?;
        validate_content(&content)?;
        validate_author(&author)?;
        Ok(Self {
            title,
            content,
            author,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

/// A validated partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    title: Option<String>,
    content: Option<String>,
    author: Option<String>,
}

impl PostChanges {
    pub fn new(
        title: Option<String>,
        content: Option<String>,
        author: Option<String>,
    ) -> Result<Self, DomainError> {
        if let Some(title) = &title {
            validate_title(title)?;
        }
        if let Some(content) = &content {
            validate_content(content)?;
        }
        if let Some(author) = &author {
            validate_author(author)?;
        }
        Ok(Self {
            title,
            content,
            author,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.author.is_none()
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.is_empty() {
        return Err(DomainError::Validation(
            "Please provide a title for this post".to_string(),
        ));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "Title cannot be more than {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.is_empty() {
        return Err(DomainError::Validation(
            "Please provide content for this post".to_string(),
        ));
    }
    Ok(())
}

fn validate_author(author: &str) -> Result<(), DomainError> {
    if author.is_empty() {
        return Err(DomainError::Validation(
            "Please provide an author name".to_string(),
        ));
    }
    if author.chars().count() > AUTHOR_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "Author name cannot be more than {AUTHOR_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Field a post listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Author,
}

impl SortField {
    /// Name used on the wire (`?sort=`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Title => "title",
            SortField::Author => "author",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "author" => Ok(SortField::Author),
            other => Err(DomainError::Validation(format!(
                "Invalid sort field: {other}"
            ))),
        }
    }
}

/// Direction of a post listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DomainError::Validation(format!(
                "Invalid sort order: {other}"
            ))),
        }
    }
}

/// Search and ordering criteria for listing posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Free text matched case-insensitively against title, content and author.
    pub query: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl PostFilter {
    /// The search text, or `None` when the query is absent or empty.
    pub fn search_text(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// Whether a post matches the search text. Everything matches an empty query.
    pub fn matches(&self, post: &Post) -> bool {
        let Some(query) = self.search_text() else {
            return true;
        };
        let needle = query.to_lowercase();
        [&post.title, &post.content, &post.author]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Ordering of two posts under this filter's sort field and direction.
    ///
    /// Text fields compare case-insensitively, with the exact text as the
    /// tie-break, so "alpha" sorts before "Beta" as it does in the database.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        let ordering = match self.sort {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => case_folded(&a.title, &b.title),
            SortField::Author => case_folded(&a.author, &b.author),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

fn case_folded(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
