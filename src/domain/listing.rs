//! Job listing and application status models.
//!
//! Listings are immutable records produced by a search response. Nothing in the
//! crate mutates a listing after it has been received; favorite flags live in
//! the bookmark store and are joined at presentation time.

use super::error::ErrorInfo;
use super::facets::{ContractType, WorkModality};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Salary bounds advertised by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A job posting as returned by the search collaborator.
///
/// `id` is opaque and unique within one result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub contract_type: Option<ContractType>,
    #[serde(default)]
    pub work_modality: Option<WorkModality>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub applicants_count: u32,
    #[serde(default)]
    pub views_count: u32,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl JobListing {
    /// Creates a listing with only the required display fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: company.into(),
            location: None,
            salary: None,
            contract_type: None,
            work_modality: None,
            skills: Vec::new(),
            applicants_count: 0,
            views_count: 0,
            published_at: None,
        }
    }
}

/// Server-side lifecycle of a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Interview,
    Accepted,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// The current user's application to one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Resolution state of a per-job application status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationState {
    Idle,
    Loading,
    Resolved,
    Error,
}

/// Cached "has the current user applied" answer for one job id.
///
/// `has_applied` and `application` are meaningful only when `state` is
/// [`ApplicationState::Resolved`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusEntry {
    pub state: ApplicationState,
    pub has_applied: bool,
    pub application: Option<ApplicationRecord>,
    pub error: Option<ErrorInfo>,
}

impl ApplicationStatusEntry {
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            state: ApplicationState::Idle,
            has_applied: false,
            application: None,
            error: None,
        }
    }

    #[must_use]
    pub const fn loading() -> Self {
        Self {
            state: ApplicationState::Loading,
            has_applied: false,
            application: None,
            error: None,
        }
    }

    #[must_use]
    pub const fn resolved(has_applied: bool, application: Option<ApplicationRecord>) -> Self {
        Self {
            state: ApplicationState::Resolved,
            has_applied,
            application,
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(error: ErrorInfo) -> Self {
        Self {
            state: ApplicationState::Error,
            has_applied: false,
            application: None,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state == ApplicationState::Resolved
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == ApplicationState::Loading
    }
}

impl Default for ApplicationStatusEntry {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_decodes_with_sparse_fields() {
        let listing: JobListing = serde_json::from_str(
            r#"{"id":"j-1","title":"Rust Engineer","company":"Acme","contractType":"FULL_TIME","skills":["rust"]}"#,
        )
        .unwrap();
        assert_eq!(listing.id, "j-1");
        assert_eq!(listing.contract_type, Some(ContractType::FullTime));
        assert_eq!(listing.skills, vec!["rust".to_string()]);
        assert!(listing.salary.is_none());
        assert_eq!(listing.applicants_count, 0);
    }

    #[test]
    fn unknown_application_status_does_not_fail_decoding() {
        let record: ApplicationRecord = serde_json::from_str(
            r#"{"id":"a-9","status":"ON_HOLD","appliedAt":"2026-01-02T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(record.status, ApplicationStatus::Unknown);
    }
}
