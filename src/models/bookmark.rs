// SPDX-License-Identifier: MIT

//! Bookmark model and change-feed events.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A saved bookmark, stored in the `bookmarks` collection.
///
/// Invariant: only visible to and mutable by its owner (`user_id`);
/// every read, update and delete is checked against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Bookmark {
    /// Store-assigned identifier (also used as document ID)
    pub id: String,
    /// Bookmark title (non-empty, trimmed)
    pub title: String,
    /// Bookmark URL (valid absolute URL, trimmed)
    pub url: String,
    /// Owning user's id
    pub user_id: String,
    /// When the bookmark was created
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A change pushed over the per-owner feed after a successful mutation.
///
/// Each event carries the affected row's full new and/or old state so
/// subscribers can apply it without a follow-up read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ChangeEvent {
    Insert { new: Bookmark },
    Update { new: Bookmark, old: Bookmark },
    Delete { old: Bookmark },
}

impl ChangeEvent {
    /// Id of the row the event refers to.
    pub fn bookmark_id(&self) -> &str {
        match self {
            ChangeEvent::Insert { new } => &new.id,
            ChangeEvent::Update { new, .. } => &new.id,
            ChangeEvent::Delete { old } => &old.id,
        }
    }

    /// Action tag, used as the SSE event name.
    pub fn action(&self) -> &'static str {
        match self {
            ChangeEvent::Insert { .. } => "insert",
            ChangeEvent::Update { .. } => "update",
            ChangeEvent::Delete { .. } => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(id: &str) -> Bookmark {
        Bookmark {
            id: id.to_string(),
            title: "Spotify".to_string(),
            url: "https://open.spotify.com/".to_string(),
            user_id: "u1".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_event_id_and_action() {
        let b = bookmark("b1");
        let insert = ChangeEvent::Insert { new: b.clone() };
        assert_eq!(insert.bookmark_id(), "b1");
        assert_eq!(insert.action(), "insert");

        let delete = ChangeEvent::Delete { old: b };
        assert_eq!(delete.bookmark_id(), "b1");
        assert_eq!(delete.action(), "delete");
    }

    #[test]
    fn test_event_serializes_with_kind_tag() {
        let event = ChangeEvent::Insert {
            new: bookmark("b1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "insert");
        assert_eq!(json["new"]["id"], "b1");
    }
}
