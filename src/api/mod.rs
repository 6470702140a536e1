//! Remote collaborator layer.
//!
//! # Modules
//!
//! - `backend`: the [`JobBoardApi`] trait and response bodies
//! - `gateway`: deadline and logging wrapper used by every component
//! - `rest`: reqwest implementation against the REST service

pub mod backend;
pub mod gateway;
pub mod rest;

pub use backend::{
    ApplicationStatusResponse, FavoritesResponse, JobBoardApi, SearchResponse, SuccessResponse,
};
pub use gateway::Gateway;
pub use rest::RestJobBoard;
