//! Timeout and logging wrapper around a [`JobBoardApi`].
//!
//! Every suspension point in the engine goes through the gateway, which
//! guarantees that each call settles: either with the collaborator's answer or
//! with [`JobsiftError::Timeout`] once the configured deadline expires.

use super::backend::{ApplicationStatusResponse, JobBoardApi, SuccessResponse};
use crate::domain::{JobListing, JobsiftError, Result};
use crate::filter::EffectiveFilter;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Shared handle to the collaborator plus the request deadline.
#[derive(Clone)]
pub struct Gateway {
    api: Arc<dyn JobBoardApi>,
    timeout: Option<Duration>,
}

impl Gateway {
    /// Wraps `api`; `timeout` of `None` lets calls run unbounded.
    #[must_use]
    pub fn new(api: Arc<dyn JobBoardApi>, timeout: Option<Duration>) -> Self {
        Self { api, timeout }
    }

    /// Runs a collaborator call under the deadline and logs its outcome.
    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .unwrap_or(Err(JobsiftError::Timeout(limit))),
            None => fut.await,
        };

        match &outcome {
            Ok(_) => tracing::debug!(operation = operation, "api call succeeded"),
            Err(e) => tracing::debug!(operation = operation, error = %e, "api call failed"),
        }
        outcome
    }

    /// Turns a `success: false` acknowledgement into an API error.
    fn require_success(operation: &str, ack: SuccessResponse) -> Result<()> {
        if ack.success {
            Ok(())
        } else {
            Err(JobsiftError::Api {
                status: 200,
                message: format!("{operation} rejected by server"),
            })
        }
    }

    /// Searches with `filter`.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error or [`JobsiftError::Timeout`].
    pub async fn search(&self, filter: &EffectiveFilter) -> Result<Vec<JobListing>> {
        self.call("search jobs", self.api.search_jobs(filter))
            .await
            .map(|response| response.listings)
    }

    /// Fetches the application status for one job.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error or [`JobsiftError::Timeout`].
    pub async fn application_status(&self, job_id: &str) -> Result<ApplicationStatusResponse> {
        self.call("application status", self.api.get_application_status(job_id))
            .await
    }

    /// Writes one bookmark flip.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, timeouts, and `success: false` answers.
    pub async fn toggle_bookmark(&self, job_id: &str) -> Result<()> {
        let ack = self.call("toggle bookmark", self.api.toggle_bookmark(job_id)).await?;
        Self::require_success("toggle bookmark", ack)
    }

    /// Withdraws an application.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, timeouts, and `success: false` answers.
    pub async fn cancel_application(&self, application_id: &str) -> Result<()> {
        let ack = self
            .call("cancel application", self.api.cancel_application(application_id))
            .await?;
        Self::require_success("cancel application", ack)
    }

    /// Lists favorited job ids.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error or [`JobsiftError::Timeout`].
    pub async fn bookmarks(&self) -> Result<Vec<String>> {
        self.call("list bookmarks", self.api.list_bookmarks())
            .await
            .map(|response| response.ids)
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
