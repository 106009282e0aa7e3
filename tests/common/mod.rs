// SPDX-License-Identifier: MIT

use smartmark::config::Config;
use smartmark::db::Store;
use smartmark::feed::ChangeFeed;
use smartmark::middleware::auth::create_jwt;
use smartmark::models::User;
use smartmark::routes::create_router;
use smartmark::services::{GoogleAuthService, IdentityBridge};
use smartmark::AppState;
use std::sync::Arc;

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = Store::memory();
    let feed = ChangeFeed::new();
    let google = GoogleAuthService::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    let identity = IdentityBridge::new(store.clone());

    let state = Arc::new(AppState {
        config,
        store,
        feed,
        google,
        identity,
    });

    (create_router(state.clone()), state)
}

/// Insert a user into the store so sessions can resolve it.
#[allow(dead_code)]
pub async fn seed_user(state: &Arc<AppState>, id: &str, email: &str) -> User {
    let user = User {
        id: id.to_string(),
        email: email.to_string(),
        name: "Test User".to_string(),
        image: None,
        provider: "google".to_string(),
        provider_account_id: format!("google-{}", id),
        access_token: Some("access".to_string()),
        refresh_token: None,
        created_at: chrono::Utc::now(),
        last_sign_in: None,
    };
    state.store.upsert_user(&user).await.expect("seed user");
    user
}

/// Mint a session token for a seeded user.
#[allow(dead_code)]
pub fn auth_token(state: &Arc<AppState>, user: &User) -> String {
    create_jwt(
        &user.email,
        Some(user.id.clone()),
        &state.config.jwt_signing_key,
    )
    .expect("create jwt")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}
