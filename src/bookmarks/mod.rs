//! Favorited job ids with optimistic toggling.

pub mod store;

pub use store::{BookmarkSet, BookmarkStore};
