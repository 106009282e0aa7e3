// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod bookmark;
pub mod user;

pub use bookmark::{Bookmark, ChangeEvent};
pub use user::User;
