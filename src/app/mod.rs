//! Application layer wiring the engine components together.
//!
//! ```text
//! input ─► SearchSession ─► SearchResults ─┐
//!                                          ├─► Presenter ─► [ViewListing]
//! toggle ─► BookmarkStore ─► BookmarkSet ──┘        │
//!                                                   └─► mount_status ─► ApplicationStatuses
//! ```
//!
//! Failures that need a transient message travel as [`Notice`](crate::domain::Notice)s
//! on the channel handed out by [`JobBoard::take_notices`].

pub mod board;

pub use board::JobBoard;
