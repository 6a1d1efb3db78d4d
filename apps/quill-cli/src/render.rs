//! Plain-text rendering of posts.

use std::fmt::Write;

use quill_shared::PostRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One line per post: id, title, author and creation time.
pub fn table(posts: &[PostRecord]) -> String {
    if posts.is_empty() {
        return "No posts found.\n".to_string();
    }

    let title_width = posts
        .iter()
        .map(|post| post.title.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for post in posts {
        let _ = writeln!(
            out,
            "{}  {:<title_width$}  {}  {}",
            post.id,
            post.title,
            post.created_at.format(TIMESTAMP_FORMAT),
            post.author,
        );
    }
    out
}

/// A single post with its full content.
pub fn detail(post: &PostRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", post.title);
    let _ = writeln!(out, "by {} | id {}", post.author, post.id);
    let _ = write!(out, "created {}", post.created_at.format(TIMESTAMP_FORMAT));
    if post.updated_at != post.created_at {
        let _ = write!(out, ", updated {}", post.updated_at.format(TIMESTAMP_FORMAT));
    }
    let _ = writeln!(out, "\n\n{}", post.content);
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(id: &str, title: &str) -> PostRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        PostRecord {
            id: id.to_string(),
            title: title.to_string(),
            content: "Some words.".to_string(),
            author: "ann".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_table_aligns_titles() {
        let out = table(&[record("1", "Hi"), record("2", "Hello")]);
        assert_eq!(
            out,
            "1  Hi     2024-03-01 09:30  ann\n2  Hello  2024-03-01 09:30  ann\n"
        );
    }

    #[test]
    fn test_table_without_posts() {
        assert_eq!(table(&[]), "No posts found.\n");
    }

    #[test]
    fn test_detail_mentions_update_only_when_edited() {
        let mut post = record("1", "Hi");
        assert!(!detail(&post).contains("updated"));

        post.updated_at = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
        let out = detail(&post);
        assert!(out.contains("created 2024-03-01 09:30, updated 2024-03-02 08:00"));
        assert!(out.ends_with("\n\nSome words.\n"));
    }
}
