// SPDX-License-Identifier: MIT

//! Identity bridge between the OAuth provider and the local `users` record.
//!
//! On every successful sign-in the provider identity is upserted by email:
//! first sign-in inserts a fresh user, later sign-ins refresh profile fields
//! and tokens while id and email stay stable. A store failure here denies
//! the sign-in rather than leaving a half-written record.

use crate::db::Store;
use crate::error::AppError;
use crate::models::User;
use crate::services::google::{GoogleProfile, GoogleTokens};

/// Identity bridge backed by the shared store.
#[derive(Clone)]
pub struct IdentityBridge {
    store: Store,
}

impl IdentityBridge {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Upsert the local user record for a successful provider sign-in.
    ///
    /// Any failure is an identity-sync error; the caller must deny the
    /// sign-in (no session token).
    pub async fn on_sign_in(
        &self,
        profile: &GoogleProfile,
        tokens: &GoogleTokens,
    ) -> Result<User, AppError> {
        let now = chrono::Utc::now();

        let user = match self
            .store
            .find_user_by_email(&profile.email)
            .await
            .map_err(sync_err)?
        {
            None => {
                let user = User {
                    id: uuid::Uuid::new_v4().to_string(),
                    email: profile.email.clone(),
                    name: profile.name.clone().unwrap_or_default(),
                    image: profile.picture.clone(),
                    provider: "google".to_string(),
                    provider_account_id: profile.sub.clone(),
                    access_token: Some(tokens.access_token.clone()),
                    refresh_token: tokens.refresh_token.clone(),
                    created_at: now,
                    last_sign_in: None,
                };
                tracing::info!(user_id = %user.id, "First sign-in, creating user");
                user
            }
            Some(mut existing) => {
                // Refresh profile and tokens; id and email stay stable.
                existing.name = profile.name.clone().unwrap_or(existing.name);
                existing.image = profile.picture.clone().or(existing.image);
                existing.access_token = Some(tokens.access_token.clone());
                if tokens.refresh_token.is_some() {
                    existing.refresh_token = tokens.refresh_token.clone();
                }
                existing.last_sign_in = Some(now);
                existing
            }
        };

        self.store.upsert_user(&user).await.map_err(sync_err)?;
        Ok(user)
    }

    /// Resolve the local user id for a session email.
    ///
    /// Absence is tolerated; downstream operations that need an id fail
    /// closed instead.
    pub async fn resolve_session_user(&self, email: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .store
            .find_user_by_email(email)
            .await?
            .map(|user| user.id))
    }
}

fn sync_err(err: AppError) -> AppError {
    AppError::IdentitySync(err.to_string())
}
