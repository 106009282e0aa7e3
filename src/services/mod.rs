// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod google;
pub mod identity;

pub use google::{GoogleAuthService, GoogleProfile, GoogleTokens};
pub use identity::IdentityBridge;
