// SPDX-License-Identifier: MIT

//! Smartmark: a personal bookmark manager.
//!
//! This crate provides the backend API for storing and searching URL
//! bookmarks, plus the client-side list view-model that applies optimistic
//! mutations and reconciles the server's change feed.

pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod viewmodel;

use config::Config;
use db::Store;
use feed::ChangeFeed;
use services::{GoogleAuthService, IdentityBridge};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub feed: ChangeFeed,
    pub google: GoogleAuthService,
    pub identity: IdentityBridge,
}
