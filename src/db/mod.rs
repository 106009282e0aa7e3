// SPDX-License-Identifier: MIT

//! Database layer (Firestore, with an in-memory backend for local dev/tests).

pub mod store;

pub use store::Store;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const BOOKMARKS: &str = "bookmarks";
}
