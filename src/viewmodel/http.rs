// SPDX-License-Identifier: MIT

//! HTTP implementation of [`BookmarkApi`] against the resource API.

use super::{ApiError, BookmarkApi};
use crate::models::Bookmark;
use serde::Deserialize;

/// Reqwest-backed client for the bookmark resource API.
#[derive(Clone)]
pub struct HttpBookmarkApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// Error body shape returned by the API.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

impl HttpBookmarkApi {
    /// `base_url` without trailing slash; `token` is the session JWT.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    async fn check<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(match response.json::<ErrorBody>().await {
                Ok(body) => ApiError(body.details.unwrap_or(body.error)),
                Err(_) => ApiError(format!("Request failed with status {}", status)),
            });
        }
        response
            .json()
            .await
            .map_err(|e| ApiError(format!("Invalid response body: {}", e)))
    }
}

impl BookmarkApi for HttpBookmarkApi {
    async fn list(&self, user_id: &str, search: &str) -> Result<Vec<Bookmark>, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/bookmarks", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("userId", user_id), ("search", search)])
            .send()
            .await
            .map_err(|e| ApiError(e.to_string()))?;

        Self::check(response).await
    }

    async fn create(&self, user_id: &str, title: &str, url: &str) -> Result<Bookmark, ApiError> {
        let body = serde_json::json!({
            "title": title,
            "url": url,
            "userId": user_id,
        });

        let response = self
            .http
            .post(format!("{}/api/bookmarks", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError(e.to_string()))?;

        Self::check(response).await
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        title: &str,
        url: &str,
    ) -> Result<Bookmark, ApiError> {
        let body = serde_json::json!({
            "id": id,
            "title": title,
            "url": url,
            "userId": user_id,
        });

        let response = self
            .http
            .put(format!("{}/api/bookmarks", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError(e.to_string()))?;

        Self::check(response).await
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(format!("{}/api/bookmarks", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("id", id), ("userId", user_id)])
            .send()
            .await
            .map_err(|e| ApiError(e.to_string()))?;

        // Body is a confirmation message; only the status matters here.
        let _: serde_json::Value = Self::check(response).await?;
        Ok(())
    }
}
