//! Optimistic mutation state machine.
//!
//! A [`Mutation`] is created by applying an optimistic change to a post
//! collection. It remembers just enough of the previous state to undo that
//! change, and moves exactly once from [`MutationState::Applied`] to either
//! [`MutationState::Confirmed`] or [`MutationState::RolledBack`].
//!
//! Everything here works on a plain `Vec<PostRecord>`; the store and the
//! network are wired in by [`PostSync`](crate::PostSync).

use chrono::Utc;
use quill_shared::{PostRecord, UpdatePostRequest};
use uuid::Uuid;

use crate::api::PostForm;

/// Prefix of locally generated surrogate identifiers.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Lifecycle of an optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    /// Local state reflects the intended outcome; the server has not answered.
    Applied,
    /// The server accepted the change and local state holds its answer.
    Confirmed,
    /// The server rejected the change and local state was restored.
    RolledBack,
}

/// What is needed to reconcile or reverse an in-flight mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingMutation {
    Create {
        temp_id: String,
    },
    Update {
        id: String,
        /// The record before the change, or `None` if it was not in the collection.
        original: Option<PostRecord>,
    },
    Delete {
        id: String,
        /// The removed record and the index it was removed from.
        removed: Option<(usize, PostRecord)>,
    },
}

#[derive(Debug)]
pub struct Mutation {
    pending: PendingMutation,
    state: MutationState,
}

/// Whether an identifier is a local surrogate rather than a server id.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

fn temp_id() -> String {
    format!("{TEMP_ID_PREFIX}{}", Uuid::new_v4())
}

impl Mutation {
    fn applied(pending: PendingMutation) -> Self {
        Self {
            pending,
            state: MutationState::Applied,
        }
    }

    /// Prepend a provisional record built from the form.
    pub fn create(posts: &mut Vec<PostRecord>, form: &PostForm) -> Self {
        let now = Utc::now();
        let temp_id = temp_id();
        posts.insert(
            0,
            PostRecord {
                id: temp_id.clone(),
                title: form.title.clone(),
                content: form.content.clone(),
                author: form.author.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Self::applied(PendingMutation::Create { temp_id })
    }

    /// Apply the changed fields to the matching record in place.
    ///
    /// An unknown id leaves the collection untouched.
    pub fn update(posts: &mut [PostRecord], id: &str, changes: &UpdatePostRequest) -> Self {
        let original = posts.iter_mut().find(|post| post.id == id).map(|post| {
            let original = post.clone();
            if let Some(title) = &changes.title {
                post.title = title.clone();
            }
            if let Some(content) = &changes.content {
                post.content = content.clone();
            }
            if let Some(author) = &changes.author {
                post.author = author.clone();
            }
            post.updated_at = Utc::now();
            original
        });
        Self::applied(PendingMutation::Update {
            id: id.to_string(),
            original,
        })
    }

    /// Remove the matching record, remembering where it was.
    pub fn delete(posts: &mut Vec<PostRecord>, id: &str) -> Self {
        let removed = posts
            .iter()
            .position(|post| post.id == id)
            .map(|index| (index, posts.remove(index)));
        Self::applied(PendingMutation::Delete {
            id: id.to_string(),
            removed,
        })
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    pub fn pending(&self) -> &PendingMutation {
        &self.pending
    }

    /// The surrogate id of a pending create.
    pub fn temp_id(&self) -> Option<&str> {
        match &self.pending {
            PendingMutation::Create { temp_id } => Some(temp_id),
            _ => None,
        }
    }

    /// Settle as accepted, swapping in the server's record where there is one.
    ///
    /// Has no effect unless the mutation is still `Applied`.
    pub fn confirm(
        &mut self,
        posts: &mut Vec<PostRecord>,
        authoritative: Option<PostRecord>,
    ) -> MutationState {
        if self.state != MutationState::Applied {
            tracing::warn!(state = ?self.state, "Ignoring confirm of a settled mutation");
            return self.state;
        }

        match (&self.pending, authoritative) {
            (PendingMutation::Create { temp_id }, Some(record)) => {
                if posts.iter().any(|post| post.id == record.id) {
                    // A reload already brought the server copy in.
                    posts.retain(|post| post.id != *temp_id);
                } else if let Some(slot) = posts.iter_mut().find(|post| post.id == *temp_id) {
                    *slot = record;
                }
            }
            (PendingMutation::Update { id, .. }, Some(record)) => {
                if let Some(slot) = posts.iter_mut().find(|post| post.id == *id) {
                    *slot = record;
                }
            }
            _ => {}
        }

        self.state = MutationState::Confirmed;
        self.state
    }

    /// Settle as rejected, restoring the collection to its pre-mutation state.
    ///
    /// Has no effect unless the mutation is still `Applied`.
    pub fn roll_back(&mut self, posts: &mut Vec<PostRecord>) -> MutationState {
        if self.state != MutationState::Applied {
            tracing::warn!(state = ?self.state, "Ignoring rollback of a settled mutation");
            return self.state;
        }

        match &self.pending {
            PendingMutation::Create { temp_id } => {
                posts.retain(|post| post.id != *temp_id);
            }
            PendingMutation::Update {
                id,
                original: Some(original),
            } => {
                if let Some(slot) = posts.iter_mut().find(|post| post.id == *id) {
                    *slot = original.clone();
                }
            }
            PendingMutation::Delete {
                removed: Some((index, record)),
                ..
            } => {
                if !posts.iter().any(|post| post.id == record.id) {
                    let at = (*index).min(posts.len());
                    posts.insert(at, record.clone());
                }
            }
            PendingMutation::Update { original: None, .. }
            | PendingMutation::Delete { removed: None, .. } => {}
        }

        self.state = MutationState::RolledBack;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(id: &str) -> PostRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        PostRecord {
            id: id.to_string(),
            title: format!("title {id}"),
            content: format!("content {id}"),
            author: "ann".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    fn collection(ids: &[&str]) -> Vec<PostRecord> {
        ids.iter().map(|id| record(id)).collect()
    }

    #[test]
    fn test_create_prepends_provisional_record() {
        let mut posts = collection(&["a", "b"]);
        let form = PostForm::new("A", "B", "C");

        let mutation = Mutation::create(&mut posts, &form);

        assert_eq!(mutation.state(), MutationState::Applied);
        assert_eq!(posts.len(), 3);
        assert_eq!(Some(posts[0].id.as_str()), mutation.temp_id());
        assert!(is_temp_id(&posts[0].id));
        assert_eq!(posts[0].title, "A");
        assert_eq!(posts[0].created_at, posts[0].updated_at);
    }

    #[test]
    fn test_create_confirm_replaces_in_place() {
        let mut posts = collection(&["a", "b"]);
        let mut mutation = Mutation::create(&mut posts, &PostForm::new("A", "B", "C"));

        let state = mutation.confirm(&mut posts, Some(record("507f1f77")));

        assert_eq!(state, MutationState::Confirmed);
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["507f1f77", "a", "b"]);
    }

    #[test]
    fn test_create_confirm_never_duplicates_an_id() {
        let mut posts = collection(&["a"]);
        let mut mutation = Mutation::create(&mut posts, &PostForm::new("A", "B", "C"));
        // A reload landed before the response and already contains the new post.
        posts.push(record("new"));

        mutation.confirm(&mut posts, Some(record("new")));

        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "new"]);
    }

    #[test]
    fn test_create_roll_back_removes_provisional_record() {
        let before = collection(&["a", "b"]);
        let mut posts = before.clone();
        let mut mutation = Mutation::create(&mut posts, &PostForm::new("A", "B", "C"));

        assert_eq!(mutation.roll_back(&mut posts), MutationState::RolledBack);
        assert_eq!(posts, before);
    }

    #[test]
    fn test_update_roll_back_restores_exact_record() {
        let before = collection(&["a", "b", "c"]);
        let mut posts = before.clone();
        let changes = UpdatePostRequest {
            title: Some("changed".to_string()),
            author: Some("bob".to_string()),
            ..Default::default()
        };

        let mut mutation = Mutation::update(&mut posts, "b", &changes);
        assert_eq!(posts[1].title, "changed");
        assert_eq!(posts[1].content, "content b");
        assert!(posts[1].updated_at > before[1].updated_at);

        mutation.roll_back(&mut posts);
        assert_eq!(posts, before);
    }

    #[test]
    fn test_update_of_unknown_id_is_a_no_op() {
        let before = collection(&["a", "b"]);
        let mut posts = before.clone();
        let changes = UpdatePostRequest {
            title: Some("x".to_string()),
            ..Default::default()
        };

        let mut mutation = Mutation::update(&mut posts, "x", &changes);
        assert_eq!(
            mutation.pending(),
            &PendingMutation::Update {
                id: "x".to_string(),
                original: None
            }
        );
        assert_eq!(posts, before);

        mutation.roll_back(&mut posts);
        assert_eq!(posts, before);
    }

    #[test]
    fn test_update_confirm_takes_server_record() {
        let mut posts = collection(&["a", "b"]);
        let changes = UpdatePostRequest {
            title: Some("local".to_string()),
            ..Default::default()
        };
        let mut mutation = Mutation::update(&mut posts, "a", &changes);

        let mut server = record("a");
        server.title = "server".to_string();
        server.updated_at += Duration::seconds(5);
        mutation.confirm(&mut posts, Some(server.clone()));

        assert_eq!(posts[0], server);
    }

    #[test]
    fn test_delete_roll_back_restores_original_index() {
        let before = collection(&["a", "b", "x", "c", "d"]);
        let mut posts = before.clone();

        let mut mutation = Mutation::delete(&mut posts, "x");
        assert_eq!(posts.len(), 4);
        assert!(posts.iter().all(|p| p.id != "x"));

        mutation.roll_back(&mut posts);
        assert_eq!(posts, before);
        assert_eq!(posts[2].id, "x");
    }

    #[test]
    fn test_delete_roll_back_clamps_to_shrunken_collection() {
        let mut posts = collection(&["a", "b", "x"]);
        let mut mutation = Mutation::delete(&mut posts, "x");
        posts.clear();

        mutation.roll_back(&mut posts);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "x");
    }

    #[test]
    fn test_settled_mutation_ignores_further_transitions() {
        let before = collection(&["a", "b"]);
        let mut posts = before.clone();
        let mut mutation = Mutation::delete(&mut posts, "a");

        assert_eq!(mutation.confirm(&mut posts, None), MutationState::Confirmed);
        assert_eq!(mutation.roll_back(&mut posts), MutationState::Confirmed);
        assert_eq!(posts.len(), 1);
    }
}
