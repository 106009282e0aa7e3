// SPDX-License-Identifier: MIT

//! Client-held bookmark list with optimistic mutations.
//!
//! The list applies every mutation locally before the server confirms it,
//! and rolls back on failure so no partial state is ever visible. Ids of
//! locally-applied mutations go into a pending set; when the same mutation
//! comes back over the change feed it is consumed silently instead of being
//! applied (and notified) a second time.

pub mod http;

pub use http::HttpBookmarkApi;

use crate::models::{Bookmark, ChangeEvent};
use std::collections::HashSet;

/// Fixed page size for the list view.
pub const PAGE_SIZE: usize = 5;

/// Error surfaced to the user as a transient notification.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ApiError(pub String);

/// Transport-agnostic handle to the bookmark resource API.
#[allow(async_fn_in_trait)]
pub trait BookmarkApi {
    async fn list(&self, user_id: &str, search: &str) -> Result<Vec<Bookmark>, ApiError>;
    async fn create(&self, user_id: &str, title: &str, url: &str) -> Result<Bookmark, ApiError>;
    async fn update(
        &self,
        user_id: &str,
        id: &str,
        title: &str,
        url: &str,
    ) -> Result<Bookmark, ApiError>;
    async fn delete(&self, user_id: &str, id: &str) -> Result<(), ApiError>;
}

/// A remote change that was applied to the held list, for user notification.
#[derive(Debug, Clone)]
pub enum RemoteChange {
    Added(Bookmark),
    Updated(Bookmark),
    Removed(Bookmark),
}

impl RemoteChange {
    /// Human-readable notification text naming the action.
    pub fn message(&self) -> String {
        match self {
            RemoteChange::Added(b) => format!("Bookmark added: {}", b.title),
            RemoteChange::Updated(b) => format!("Bookmark updated: {}", b.title),
            RemoteChange::Removed(b) => format!("Bookmark deleted: {}", b.title),
        }
    }
}

/// The bookmark list view-model.
///
/// Holds the only mutable copy of the list; nothing else touches it.
/// Ordering invariant: `items` is always newest-creation-time first.
pub struct BookmarkList<A: BookmarkApi> {
    api: A,
    user_id: String,
    items: Vec<Bookmark>,
    search: String,
    page: usize,
    pending: HashSet<String>,
    loading: bool,
}

impl<A: BookmarkApi> BookmarkList<A> {
    pub fn new(api: A, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            items: Vec::new(),
            search: String::new(),
            page: 1,
            pending: HashSet::new(),
            loading: false,
        }
    }

    // ─── Refresh ─────────────────────────────────────────────

    /// Replace the held list wholesale from the server.
    ///
    /// On failure the previous list stays untouched.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.loading = true;
        let result = self.api.list(&self.user_id, &self.search).await;
        self.loading = false;

        self.items = result?;
        Ok(())
    }

    // ─── Optimistic mutations ────────────────────────────────

    /// Create a bookmark, optimistically prepending a synthetic row.
    pub async fn create(&mut self, title: &str, url: &str) -> Result<Bookmark, ApiError> {
        let temp_id = format!("local-{}", uuid::Uuid::new_v4());
        let synthetic = Bookmark {
            id: temp_id.clone(),
            title: title.trim().to_string(),
            url: url.trim().to_string(),
            user_id: self.user_id.clone(),
            created_at: chrono::Utc::now(),
        };
        self.items.insert(0, synthetic);

        match self.api.create(&self.user_id, title, url).await {
            Ok(created) => {
                // Swap the synthetic row for the authoritative one.
                if let Some(pos) = self.items.iter().position(|b| b.id == temp_id) {
                    self.items[pos] = created.clone();
                }
                self.pending.insert(created.id.clone());
                Ok(created)
            }
            Err(e) => {
                // No partial state may remain.
                self.items.retain(|b| b.id != temp_id);
                Err(e)
            }
        }
    }

    /// Edit a bookmark in place, restoring the snapshot on failure.
    pub async fn update(&mut self, id: &str, title: &str, url: &str) -> Result<Bookmark, ApiError> {
        let pos = self
            .items
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| ApiError("Bookmark is not in the list".to_string()))?;
        let snapshot = self.items[pos].clone();

        self.items[pos].title = title.trim().to_string();
        self.items[pos].url = url.trim().to_string();

        match self.api.update(&self.user_id, id, title, url).await {
            Ok(updated) => {
                if let Some(pos) = self.items.iter().position(|b| b.id == id) {
                    self.items[pos] = updated.clone();
                }
                self.pending.insert(updated.id.clone());
                Ok(updated)
            }
            Err(e) => {
                if let Some(pos) = self.items.iter().position(|b| b.id == id) {
                    self.items[pos] = snapshot;
                }
                Err(e)
            }
        }
    }

    /// Remove a bookmark, re-inserting the snapshot in order on failure.
    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        let pos = self
            .items
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| ApiError("Bookmark is not in the list".to_string()))?;
        let snapshot = self.items.remove(pos);

        match self.api.delete(&self.user_id, id).await {
            Ok(()) => {
                self.pending.insert(snapshot.id);
                Ok(())
            }
            Err(e) => {
                self.insert_sorted(snapshot);
                Err(e)
            }
        }
    }

    // ─── Remote reconciliation ───────────────────────────────

    /// Apply one change-feed event to the held list.
    ///
    /// Echoes of locally-applied mutations are consumed from the pending
    /// set exactly once and ignored. Everything else is applied and
    /// returned for user notification.
    pub fn apply_remote(&mut self, event: ChangeEvent) -> Option<RemoteChange> {
        if self.pending.remove(event.bookmark_id()) {
            return None;
        }

        match event {
            ChangeEvent::Insert { new } => {
                // Duplicate-guard: another path may have added it already.
                if self.items.iter().any(|b| b.id == new.id) {
                    return None;
                }
                self.insert_sorted(new.clone());
                Some(RemoteChange::Added(new))
            }
            ChangeEvent::Update { new, .. } => {
                let pos = self.items.iter().position(|b| b.id == new.id)?;
                self.items[pos] = new.clone();
                Some(RemoteChange::Updated(new))
            }
            ChangeEvent::Delete { old } => {
                let pos = self.items.iter().position(|b| b.id == old.id)?;
                let removed = self.items.remove(pos);
                Some(RemoteChange::Removed(removed))
            }
        }
    }

    /// Insert preserving descending-creation-time order.
    fn insert_sorted(&mut self, bookmark: Bookmark) {
        let pos = self
            .items
            .iter()
            .position(|b| b.created_at <= bookmark.created_at)
            .unwrap_or(self.items.len());
        self.items.insert(pos, bookmark);
    }

    // ─── Search & pagination ─────────────────────────────────

    /// Change the search text; resets to page 1. Caller refreshes after.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(PAGE_SIZE)
    }

    /// Advance a page; no-op on the last page.
    pub fn next_page(&mut self) {
        if self.page < self.page_count() {
            self.page += 1;
        }
    }

    /// Go back a page; no-op on the first page.
    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// The slice of bookmarks on the current page.
    pub fn visible(&self) -> &[Bookmark] {
        let start = (self.page - 1) * PAGE_SIZE;
        if start >= self.items.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.items.len());
        &self.items[start..end]
    }

    // ─── Accessors ───────────────────────────────────────────

    pub fn items(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
