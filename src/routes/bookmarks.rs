// SPDX-License-Identifier: MIT

//! Bookmark resource API and the per-owner SSE change feed.
//!
//! All operations take an explicit `userId` and are ownership-checked:
//! the supplied id must match the authenticated session's resolved user id,
//! and update/delete additionally check the stored row's owner. A missing
//! row is 404; an owner mismatch is 403, kept distinct so enumeration is
//! detectable while access stays denied.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Bookmark, ChangeEvent};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/bookmarks",
            get(list_bookmarks)
                .post(create_bookmark)
                .put(update_bookmark)
                .delete(delete_bookmark),
        )
        .route("/api/bookmarks/events", get(bookmark_events))
}

/// Title/url pair after trimming, validated before any store access.
#[derive(Debug, Validate)]
struct BookmarkInput {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    title: String,
    #[validate(url(message = "Invalid URL format"))]
    url: String,
}

impl BookmarkInput {
    fn parse(title: &str, url: &str) -> Result<Self> {
        let input = Self {
            title: title.trim().to_string(),
            url: url.trim().to_string(),
        };
        input
            .validate()
            .map_err(|e| AppError::BadRequest(validation_message(e)))?;
        Ok(input)
    }
}

/// First human-readable message out of a validator error set.
fn validation_message(errors: validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid input".to_string())
}

/// The explicit `userId` on every call must match the session's resolved
/// user id. A session without a resolved id fails closed.
fn ensure_session_owner(user: &AuthUser, user_id: &str) -> Result<()> {
    match &user.user_id {
        Some(id) if id == user_id => Ok(()),
        _ => Err(AppError::Forbidden(
            "User ID does not match session".to_string(),
        )),
    }
}

/// Case-insensitive substring match over title and url.
fn matches_search(bookmark: &Bookmark, search: &str) -> bool {
    let needle = search.to_lowercase();
    bookmark.title.to_lowercase().contains(&needle)
        || bookmark.url.to_lowercase().contains(&needle)
}

// ─── List / Search ───────────────────────────────────────────

#[derive(Deserialize)]
struct ListParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    search: Option<String>,
}

/// List the owner's bookmarks, newest first, optionally filtered by search
/// text. Pagination is a view-model concern, not done here.
async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Bookmark>>> {
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;
    ensure_session_owner(&user, &user_id)?;

    let mut rows = state.store.list_bookmarks(&user_id).await?;

    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        rows.retain(|b| matches_search(b, search));
    }

    Ok(Json(rows))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateBookmarkRequest {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

async fn create_bookmark(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<Bookmark>)> {
    let (title, url, user_id) = match (req.title, req.url, req.user_id) {
        (Some(title), Some(url), Some(user_id)) => (title, url, user_id),
        _ => {
            return Err(AppError::BadRequest(
                "Missing required fields: title, url, userId".to_string(),
            ))
        }
    };
    ensure_session_owner(&user, &user_id)?;
    let input = BookmarkInput::parse(&title, &url)?;

    let bookmark = Bookmark {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title,
        url: input.url,
        user_id: user_id.clone(),
        created_at: chrono::Utc::now(),
    };

    state.store.insert_bookmark(&bookmark).await?;
    state.feed.publish(
        &user_id,
        ChangeEvent::Insert {
            new: bookmark.clone(),
        },
    );

    tracing::debug!(bookmark_id = %bookmark.id, user_id = %user_id, "Bookmark created");

    Ok((StatusCode::CREATED, Json(bookmark)))
}

// ─── Update ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct UpdateBookmarkRequest {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

async fn update_bookmark(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateBookmarkRequest>,
) -> Result<Json<Bookmark>> {
    let (id, title, url, user_id) = match (req.id, req.title, req.url, req.user_id) {
        (Some(id), Some(title), Some(url), Some(user_id)) => (id, title, url, user_id),
        _ => {
            return Err(AppError::BadRequest(
                "Missing required fields: id, title, url, userId".to_string(),
            ))
        }
    };
    ensure_session_owner(&user, &user_id)?;
    let input = BookmarkInput::parse(&title, &url)?;

    let existing = state
        .store
        .get_bookmark(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bookmark not found".to_string()))?;

    if existing.user_id != user_id {
        return Err(AppError::Forbidden(
            "You do not own this bookmark".to_string(),
        ));
    }

    let updated = Bookmark {
        title: input.title,
        url: input.url,
        ..existing.clone()
    };

    state.store.update_bookmark(&updated).await?;
    state.feed.publish(
        &user_id,
        ChangeEvent::Update {
            new: updated.clone(),
            old: existing,
        },
    );

    tracing::debug!(bookmark_id = %updated.id, user_id = %user_id, "Bookmark updated");

    Ok(Json(updated))
}

// ─── Delete ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct DeleteParams {
    id: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// Response for bookmark deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteResponse {
    pub message: String,
}

async fn delete_bookmark(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteResponse>> {
    let (id, user_id) = match (params.id, params.user_id) {
        (Some(id), Some(user_id)) => (id, user_id),
        _ => {
            return Err(AppError::BadRequest(
                "Missing required fields: id, userId".to_string(),
            ))
        }
    };
    ensure_session_owner(&user, &user_id)?;

    let existing = state
        .store
        .get_bookmark(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bookmark not found".to_string()))?;

    if existing.user_id != user_id {
        return Err(AppError::Forbidden(
            "You do not own this bookmark".to_string(),
        ));
    }

    state.store.delete_bookmark(&id).await?;
    state
        .feed
        .publish(&user_id, ChangeEvent::Delete { old: existing });

    tracing::debug!(bookmark_id = %id, user_id = %user_id, "Bookmark deleted");

    Ok(Json(DeleteResponse {
        message: "Bookmark deleted successfully".to_string(),
    }))
}

// ─── Change Feed (SSE) ───────────────────────────────────────

#[derive(Deserialize)]
struct EventsParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// Stream the owner's change feed as Server-Sent Events.
///
/// Event name is the action tag (insert/update/delete), data is the JSON
/// event. Lagged receivers skip missed events silently.
async fn bookmark_events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<EventsParams>,
) -> Result<Sse<impl futures_util::Stream<Item = std::result::Result<Event, std::convert::Infallible>>>>
{
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;
    ensure_session_owner(&user, &user_id)?;

    let rx = state.feed.subscribe(&user_id);

    use tokio_stream::StreamExt as _;
    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(|result| {
        match result {
            Ok(event) => {
                let name = event.action();
                serde_json::to_string(&event)
                    .ok()
                    .map(|json| Ok(Event::default().event(name).data(json)))
            }
            Err(_) => None, // Skip lagged errors
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
