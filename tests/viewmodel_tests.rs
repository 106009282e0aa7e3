// SPDX-License-Identifier: MIT

//! Bookmark list view-model tests: optimistic mutations with rollback,
//! change-feed echo suppression, and pagination.

use smartmark::models::{Bookmark, ChangeEvent};
use smartmark::viewmodel::{ApiError, BookmarkApi, BookmarkList, RemoteChange, PAGE_SIZE};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory fake of the resource API with per-operation failure injection.
#[derive(Default)]
struct FakeApi {
    rows: Mutex<Vec<Bookmark>>,
    next_id: AtomicUsize,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
    fail_delete: AtomicBool,
}

impl FakeApi {
    fn seed(&self, bookmarks: Vec<Bookmark>) {
        *self.rows.lock().unwrap() = bookmarks;
    }
}

fn fail(flag: &AtomicBool) -> Result<(), ApiError> {
    if flag.load(Ordering::SeqCst) {
        Err(ApiError("network down".to_string()))
    } else {
        Ok(())
    }
}

/// Cloneable handle so the view-model and the test share one fake; a local
/// newtype is needed because the orphan rule forbids `impl BookmarkApi for
/// Arc<FakeApi>` here.
#[derive(Clone, Default)]
struct SharedApi(Arc<FakeApi>);

impl std::ops::Deref for SharedApi {
    type Target = FakeApi;
    fn deref(&self) -> &FakeApi {
        &self.0
    }
}

impl BookmarkApi for SharedApi {
    async fn list(&self, user_id: &str, search: &str) -> Result<Vec<Bookmark>, ApiError> {
        fail(&self.fail_list)?;
        let needle = search.to_lowercase();
        let mut rows: Vec<Bookmark> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.user_id == user_id)
            .filter(|b| needle.is_empty() || b.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create(&self, user_id: &str, title: &str, url: &str) -> Result<Bookmark, ApiError> {
        fail(&self.fail_create)?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let bookmark = Bookmark {
            id: format!("srv-{}", n),
            title: title.trim().to_string(),
            url: url.trim().to_string(),
            user_id: user_id.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.rows.lock().unwrap().push(bookmark.clone());
        Ok(bookmark)
    }

    async fn update(
        &self,
        _user_id: &str,
        id: &str,
        title: &str,
        url: &str,
    ) -> Result<Bookmark, ApiError> {
        fail(&self.fail_update)?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ApiError("Bookmark not found".to_string()))?;
        row.title = title.trim().to_string();
        row.url = url.trim().to_string();
        Ok(row.clone())
    }

    async fn delete(&self, _user_id: &str, id: &str) -> Result<(), ApiError> {
        fail(&self.fail_delete)?;
        self.rows.lock().unwrap().retain(|b| b.id != id);
        Ok(())
    }
}

fn bookmark(id: &str, title: &str, minutes_ago: i64) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: title.to_string(),
        url: "https://example.com/".to_string(),
        user_id: "u1".to_string(),
        created_at: chrono::Utc::now() - chrono::Duration::minutes(minutes_ago),
    }
}

#[tokio::test]
async fn test_create_swaps_synthetic_row_for_server_row() {
    let api = SharedApi::default();
    let mut vm = BookmarkList::new(api.clone(), "u1");

    let created = vm.create("Spotify", "https://open.spotify.com/").await.unwrap();

    assert_eq!(vm.items().len(), 1);
    assert_eq!(vm.items()[0].id, created.id);
    assert!(created.id.starts_with("srv-"));
}

#[tokio::test]
async fn test_create_failure_leaves_no_partial_state() {
    let api = SharedApi::default();
    let mut vm = BookmarkList::new(api.clone(), "u1");
    api.fail_create.store(true, Ordering::SeqCst);

    let err = vm.create("Spotify", "https://open.spotify.com/").await;

    assert!(err.is_err());
    assert!(vm.items().is_empty());
    assert!(api.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_failure_restores_snapshot() {
    let api = SharedApi::default();
    api.seed(vec![bookmark("b1", "Original", 5)]);
    let mut vm = BookmarkList::new(api.clone(), "u1");
    vm.refresh().await.unwrap();

    api.fail_update.store(true, Ordering::SeqCst);
    let err = vm.update("b1", "Edited", "https://edited.example/").await;

    assert!(err.is_err());
    assert_eq!(vm.items()[0].title, "Original");
    assert_eq!(vm.items()[0].url, "https://example.com/");
}

#[tokio::test]
async fn test_delete_failure_reinserts_in_newest_first_order() {
    let api = SharedApi::default();
    api.seed(vec![
        bookmark("new", "New", 1),
        bookmark("mid", "Mid", 10),
        bookmark("old", "Old", 30),
    ]);
    let mut vm = BookmarkList::new(api.clone(), "u1");
    vm.refresh().await.unwrap();

    api.fail_delete.store(true, Ordering::SeqCst);
    let err = vm.delete("mid").await;

    assert!(err.is_err());
    let ids: Vec<&str> = vm.items().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
}

#[tokio::test]
async fn test_refresh_failure_keeps_previous_list() {
    let api = SharedApi::default();
    api.seed(vec![bookmark("b1", "Kept", 5)]);
    let mut vm = BookmarkList::new(api.clone(), "u1");
    vm.refresh().await.unwrap();

    api.fail_list.store(true, Ordering::SeqCst);
    assert!(vm.refresh().await.is_err());

    assert_eq!(vm.items().len(), 1);
    assert_eq!(vm.items()[0].title, "Kept");
    assert!(!vm.is_loading());
}

#[tokio::test]
async fn test_echoed_insert_is_suppressed_exactly_once() {
    let api = SharedApi::default();
    let mut vm = BookmarkList::new(api.clone(), "u1");

    let created = vm.create("Spotify", "https://open.spotify.com/").await.unwrap();

    // The echo of our own create is consumed silently.
    let echo = ChangeEvent::Insert {
        new: created.clone(),
    };
    assert!(vm.apply_remote(echo.clone()).is_none());

    // A replayed insert for the same id hits the duplicate-guard, not the
    // pending set, and still produces no notification or extra row.
    assert!(vm.apply_remote(echo).is_none());
    assert_eq!(vm.items().len(), 1);

    // But a later remote update for the same row does apply.
    let mut edited = created.clone();
    edited.title = "Spotify (edited elsewhere)".to_string();
    let change = vm.apply_remote(ChangeEvent::Update {
        new: edited,
        old: created,
    });
    assert!(matches!(change, Some(RemoteChange::Updated(_))));
    assert_eq!(
        change.unwrap().message(),
        "Bookmark updated: Spotify (edited elsewhere)"
    );
    assert_eq!(vm.items()[0].title, "Spotify (edited elsewhere)");
}

#[tokio::test]
async fn test_echoed_delete_is_suppressed() {
    let api = SharedApi::default();
    api.seed(vec![bookmark("b1", "Doomed", 5)]);
    let mut vm = BookmarkList::new(api.clone(), "u1");
    vm.refresh().await.unwrap();

    vm.delete("b1").await.unwrap();
    assert!(vm.items().is_empty());

    let echo = ChangeEvent::Delete {
        old: bookmark("b1", "Doomed", 5),
    };
    assert!(vm.apply_remote(echo).is_none());
}

#[tokio::test]
async fn test_remote_insert_from_another_session_is_applied() {
    let api = SharedApi::default();
    let mut vm = BookmarkList::new(api.clone(), "u1");

    let incoming = bookmark("other-device", "From elsewhere", 0);
    let change = vm.apply_remote(ChangeEvent::Insert {
        new: incoming.clone(),
    });

    assert!(matches!(change, Some(RemoteChange::Added(_))));
    assert_eq!(
        change.unwrap().message(),
        "Bookmark added: From elsewhere"
    );
    assert_eq!(vm.items().len(), 1);
    assert_eq!(vm.items()[0].id, "other-device");
}

#[tokio::test]
async fn test_remote_delete_from_another_session_is_applied() {
    let api = SharedApi::default();
    api.seed(vec![bookmark("b1", "Doomed", 5)]);
    let mut vm = BookmarkList::new(api.clone(), "u1");
    vm.refresh().await.unwrap();

    let change = vm.apply_remote(ChangeEvent::Delete {
        old: bookmark("b1", "Doomed", 5),
    });

    assert!(matches!(change, Some(RemoteChange::Removed(_))));
    assert_eq!(change.unwrap().message(), "Bookmark deleted: Doomed");
    assert!(vm.items().is_empty());
}

#[tokio::test]
async fn test_remote_delete_for_unknown_row_is_ignored() {
    let api = SharedApi::default();
    let mut vm = BookmarkList::new(api.clone(), "u1");

    let change = vm.apply_remote(ChangeEvent::Delete {
        old: bookmark("never-seen", "Ghost", 0),
    });

    assert!(change.is_none());
}

#[tokio::test]
async fn test_pagination_clamps_at_boundaries() {
    let api = SharedApi::default();
    let rows: Vec<Bookmark> = (0..12)
        .map(|i| bookmark(&format!("b{}", i), &format!("B{}", i), i))
        .collect();
    api.seed(rows);
    let mut vm = BookmarkList::new(api.clone(), "u1");
    vm.refresh().await.unwrap();

    assert_eq!(vm.page_count(), 3);
    assert_eq!(vm.page(), 1);
    assert_eq!(vm.visible().len(), PAGE_SIZE);

    vm.prev_page(); // no-op on first page
    assert_eq!(vm.page(), 1);

    vm.next_page();
    vm.next_page();
    assert_eq!(vm.page(), 3);
    assert_eq!(vm.visible().len(), 2);

    vm.next_page(); // no-op on last page
    assert_eq!(vm.page(), 3);
}

#[tokio::test]
async fn test_search_change_resets_to_first_page() {
    let api = SharedApi::default();
    let rows: Vec<Bookmark> = (0..12)
        .map(|i| bookmark(&format!("b{}", i), &format!("B{}", i), i))
        .collect();
    api.seed(rows);
    let mut vm = BookmarkList::new(api.clone(), "u1");
    vm.refresh().await.unwrap();
    vm.next_page();
    assert_eq!(vm.page(), 2);

    vm.set_search("B1");
    assert_eq!(vm.page(), 1);
    assert_eq!(vm.search(), "B1");

    // Refresh with the new search applies the server-side filter.
    vm.refresh().await.unwrap();
    assert!(vm.items().iter().all(|b| b.title.contains("B1")));
}
