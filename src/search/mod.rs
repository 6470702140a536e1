//! Search orchestration.
//!
//! - [`state`]: pure state container and sequence-number bookkeeping
//! - [`session`]: async orchestrator tying debouncer, state and gateway together

pub mod session;
pub mod state;

pub use session::SearchSession;
pub use state::{SearchPhase, SearchResults, SearchState, Settlement};
