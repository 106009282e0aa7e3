// SPDX-License-Identifier: MIT

//! User model for storage and sessions.

use serde::{Deserialize, Serialize};

/// User profile stored in the `users` collection.
///
/// Keyed by a store-assigned opaque id; `email` is the natural key the
/// identity bridge upserts by. Never deleted by the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier (also used as document ID)
    pub id: String,
    /// Email address (unique natural key)
    pub email: String,
    /// Display name
    pub name: String,
    /// Avatar image URL
    pub image: Option<String>,
    /// Identity provider name (e.g. "google")
    pub provider: String,
    /// Account id at the identity provider
    pub provider_account_id: String,
    /// OAuth access token from the provider
    pub access_token: Option<String>,
    /// OAuth refresh token from the provider
    pub refresh_token: Option<String>,
    /// When the user first signed in
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Last successful sign-in
    pub last_sign_in: Option<chrono::DateTime<chrono::Utc>>,
}
