//! Job board collaborator abstraction.
//!
//! This module defines the [`JobBoardApi`] trait that abstracts over the remote
//! REST service. The engine only ever talks to this trait, so the HTTP
//! transport can be swapped for an in-memory double in tests.
//!
//! # Design Philosophy
//!
//! The trait is minimal: one method per remote call the engine makes, with
//! the response shapes the service returns. Timeouts, logging and the mapping
//! of `success: false` answers to errors live in [`super::Gateway`], not in
//! implementations.

use crate::domain::{ApplicationRecord, JobListing, Result};
use crate::filter::EffectiveFilter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of a search answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub listings: Vec<JobListing>,
}

/// Body of an application status answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusResponse {
    pub has_applied: bool,
    #[serde(default)]
    pub application: Option<ApplicationRecord>,
}

/// Body of a write acknowledged with a success flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Body of the favorites listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub ids: Vec<String>,
}

/// Remote operations consumed by the engine.
///
/// Implementations must be cheap to share (`Send + Sync`) since every mounted
/// card and every in-flight search holds a handle.
#[async_trait]
pub trait JobBoardApi: Send + Sync {
    /// Runs a search. Absent filter fields must not be sent.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    async fn search_jobs(&self, filter: &EffectiveFilter) -> Result<SearchResponse>;

    /// Asks whether the current user has applied to `job_id`.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    async fn get_application_status(&self, job_id: &str) -> Result<ApplicationStatusResponse>;

    /// Flips the server-side favorite flag of `job_id`.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    async fn toggle_bookmark(&self, job_id: &str) -> Result<SuccessResponse>;

    /// Withdraws the application `application_id`.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    async fn cancel_application(&self, application_id: &str) -> Result<SuccessResponse>;

    /// Lists the ids currently favorited on the server.
    ///
    /// Backends without a favorites endpoint keep the default, which reports
    /// none.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    async fn list_bookmarks(&self) -> Result<FavoritesResponse> {
        Ok(FavoritesResponse::default())
    }
}
