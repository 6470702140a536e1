//! Presentation layer.
//!
//! Turns search results and bookmark state into display-ready rows:
//!
//! ```text
//! SearchResults + BookmarkSet → Presenter → [ViewListing]
//! ```

pub mod viewmodel;

pub use viewmodel::{present, Presenter, ViewListing};
