// SPDX-License-Identifier: MIT

//! Typed store operations over two interchangeable backends.
//!
//! Production uses Firestore; local development and tests use an in-memory
//! backend (`MEMORY_STORE=1`) with the same semantics. All durable state
//! lives in the store; the application only holds request- or view-scoped
//! copies.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Bookmark, User};
use dashmap::DashMap;
use std::sync::Arc;

/// Bookmark and user store.
#[derive(Clone)]
pub struct Store {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
}

#[derive(Default)]
struct MemoryStore {
    users: DashMap<String, User>,
    bookmarks: DashMap<String, Bookmark>,
}

impl Store {
    /// Connect to Firestore.
    ///
    /// For local development with the emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn connect(project_id: &str) -> Result<Self, AppError> {
        // The emulator takes an unauthenticated connection to avoid local
        // credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::connect_emulator(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn connect_emulator(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create an in-memory store (local dev and tests).
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::default())),
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Look up a user by email (the identity bridge's natural key).
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let users: Vec<User> = client
                    .fluent()
                    .select()
                    .from(collections::USERS)
                    .filter(|q| q.field("email").eq(email))
                    .limit(1)
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(users.into_iter().next())
            }
            Backend::Memory(mem) => Ok(mem
                .users
                .iter()
                .find(|u| u.email == email)
                .map(|u| u.value().clone())),
        }
    }

    /// Create or update a user (keyed by id).
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(&user.id)
                    .object(user)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(mem) => {
                mem.users.insert(user.id.clone(), user.clone());
                Ok(())
            }
        }
    }

    // ─── Bookmark Operations ─────────────────────────────────────

    /// Get a bookmark by id.
    pub async fn get_bookmark(&self, id: &str) -> Result<Option<Bookmark>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::BOOKMARKS)
                .obj()
                .one(id)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(mem) => Ok(mem.bookmarks.get(id).map(|b| b.value().clone())),
        }
    }

    /// Get all bookmarks owned by a user, newest creation time first.
    pub async fn list_bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .from(collections::BOOKMARKS)
                .filter(|q| q.field("user_id").eq(user_id))
                .order_by([(
                    "created_at",
                    firestore::FirestoreQueryDirection::Descending,
                )])
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(mem) => {
                let mut rows: Vec<Bookmark> = mem
                    .bookmarks
                    .iter()
                    .filter(|b| b.user_id == user_id)
                    .map(|b| b.value().clone())
                    .collect();
                rows.sort_by(|a, b| {
                    b.created_at
                        .cmp(&a.created_at)
                        .then_with(|| b.id.cmp(&a.id))
                });
                Ok(rows)
            }
        }
    }

    /// Insert a new bookmark row.
    pub async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<(), AppError> {
        self.write_bookmark(bookmark).await
    }

    /// Update an existing bookmark row in place.
    pub async fn update_bookmark(&self, bookmark: &Bookmark) -> Result<(), AppError> {
        self.write_bookmark(bookmark).await
    }

    async fn write_bookmark(&self, bookmark: &Bookmark) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::BOOKMARKS)
                    .document_id(&bookmark.id)
                    .object(bookmark)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(mem) => {
                mem.bookmarks.insert(bookmark.id.clone(), bookmark.clone());
                Ok(())
            }
        }
    }

    /// Remove a bookmark row. No soft-delete.
    pub async fn delete_bookmark(&self, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                client
                    .fluent()
                    .delete()
                    .from(collections::BOOKMARKS)
                    .document_id(id)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(mem) => {
                mem.bookmarks.remove(id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(id: &str, user_id: &str, minutes_ago: i64) -> Bookmark {
        Bookmark {
            id: id.to_string(),
            title: format!("title-{}", id),
            url: "https://example.com/".to_string(),
            user_id: user_id.to_string(),
            created_at: chrono::Utc::now() - chrono::Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_memory_list_is_newest_first_and_owner_scoped() {
        let store = Store::memory();
        store.insert_bookmark(&bookmark("old", "u1", 30)).await.unwrap();
        store.insert_bookmark(&bookmark("new", "u1", 1)).await.unwrap();
        store.insert_bookmark(&bookmark("other", "u2", 5)).await.unwrap();

        let rows = store.list_bookmarks("u1").await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_memory_delete_removes_row() {
        let store = Store::memory();
        store.insert_bookmark(&bookmark("b1", "u1", 0)).await.unwrap();
        assert!(store.get_bookmark("b1").await.unwrap().is_some());

        store.delete_bookmark("b1").await.unwrap();
        assert!(store.get_bookmark("b1").await.unwrap().is_none());
        assert!(store.list_bookmarks("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_find_user_by_email() {
        let store = Store::memory();
        let user = User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            image: None,
            provider: "google".to_string(),
            provider_account_id: "g-1".to_string(),
            access_token: None,
            refresh_token: None,
            created_at: chrono::Utc::now(),
            last_sign_in: None,
        };
        store.upsert_user(&user).await.unwrap();

        let found = store.find_user_by_email("a@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some("u1".to_string()));
        assert!(store.find_user_by_email("b@example.com").await.unwrap().is_none());
    }
}
