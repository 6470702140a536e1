//! Infrastructure layer: timers and filesystem locations.
//!
//! - [`debounce`]: tokio-backed quiet-period debouncer
//! - [`paths`]: data directory and tilde expansion

pub mod debounce;
pub mod paths;

pub use debounce::Debouncer;
pub use paths::{expand_tilde, get_data_dir};
