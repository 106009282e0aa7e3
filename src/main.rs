// SPDX-License-Identifier: MIT

//! Smartmark API Server
//!
//! Serves the bookmark resource API, the per-user change feed, and the
//! Google OAuth sign-in flow backing it.

use smartmark::{
    config::Config,
    db::Store,
    feed::ChangeFeed,
    services::{GoogleAuthService, IdentityBridge},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Smartmark API");

    // Connect the bookmark store (Firestore, or in-memory for local dev)
    let store = if config.memory_store {
        tracing::info!("Using in-memory store");
        Store::memory()
    } else {
        Store::connect(&config.gcp_project_id)
            .await
            .expect("Failed to connect to Firestore")
    };

    let feed = ChangeFeed::new();
    let google = GoogleAuthService::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    let identity = IdentityBridge::new(store.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config,
        store,
        feed,
        google,
        identity,
    });

    // Build router
    let app = smartmark::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("smartmark=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
