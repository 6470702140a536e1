//! Per-card application status resolution.
//!
//! - [`cache`]: the shared entries and the liveness bookkeeping
//! - [`resolver`]: mounts, fetches and cancellation on top of the cache

pub mod cache;
pub mod resolver;

pub use cache::{Applied, Fetch, MountToken, StatusCache};
pub use resolver::{ApplicationStatuses, StatusMount};
