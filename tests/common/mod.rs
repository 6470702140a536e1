//! Scripted in-memory job board shared by the integration tests.
//!
//! Each collaborator call pops the next scripted step for that operation (and
//! job id, where relevant), sleeps for the step's delay on the tokio clock and
//! returns its outcome. Unscripted calls succeed immediately with a default.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use jobsift::api::{ApplicationStatusResponse, FavoritesResponse, SearchResponse, SuccessResponse};
use jobsift::domain::{ApplicationRecord, ApplicationStatus};
use jobsift::{EffectiveFilter, Gateway, JobBoardApi, JobListing, JobsiftError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TIMEOUT: Duration = Duration::from_secs(30);

struct Step<T> {
    delay: Duration,
    outcome: Result<T>,
}

async fn play<T>(step: Option<Step<T>>, default: T) -> Result<T> {
    match step {
        Some(step) => {
            tokio::time::sleep(step.delay).await;
            step.outcome
        }
        None => Ok(default),
    }
}

#[derive(Default)]
pub struct FakeBoard {
    searches: Mutex<VecDeque<Step<Vec<JobListing>>>>,
    search_calls: Mutex<Vec<EffectiveFilter>>,
    statuses: Mutex<HashMap<String, VecDeque<Step<ApplicationStatusResponse>>>>,
    status_calls: Mutex<Vec<String>>,
    bookmarks: Mutex<HashMap<String, VecDeque<Step<SuccessResponse>>>>,
    bookmark_calls: Mutex<Vec<String>>,
    cancels: Mutex<VecDeque<Step<SuccessResponse>>>,
    cancel_calls: Mutex<Vec<String>>,
    favorites: Mutex<Vec<String>>,
}

impl FakeBoard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gateway(self: &Arc<Self>) -> Gateway {
        Gateway::new(Arc::clone(self) as Arc<dyn JobBoardApi>, Some(TIMEOUT))
    }

    pub fn search_ok(&self, delay_ms: u64, listings: Vec<JobListing>) {
        self.searches.lock().unwrap().push_back(Step {
            delay: Duration::from_millis(delay_ms),
            outcome: Ok(listings),
        });
    }

    pub fn search_err(&self, delay_ms: u64, error: JobsiftError) {
        self.searches.lock().unwrap().push_back(Step {
            delay: Duration::from_millis(delay_ms),
            outcome: Err(error),
        });
    }

    pub fn status(&self, job_id: &str, delay_ms: u64, outcome: Result<ApplicationStatusResponse>) {
        self.statuses
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .push_back(Step {
                delay: Duration::from_millis(delay_ms),
                outcome,
            });
    }

    pub fn bookmark(&self, job_id: &str, delay_ms: u64, outcome: Result<SuccessResponse>) {
        self.bookmarks
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .push_back(Step {
                delay: Duration::from_millis(delay_ms),
                outcome,
            });
    }

    pub fn cancel(&self, delay_ms: u64, outcome: Result<SuccessResponse>) {
        self.cancels.lock().unwrap().push_back(Step {
            delay: Duration::from_millis(delay_ms),
            outcome,
        });
    }

    pub fn set_favorites(&self, ids: &[&str]) {
        *self.favorites.lock().unwrap() = ids.iter().map(|s| (*s).to_string()).collect();
    }

    pub fn search_calls(&self) -> Vec<EffectiveFilter> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn bookmark_calls(&self) -> Vec<String> {
        self.bookmark_calls.lock().unwrap().clone()
    }

    pub fn cancel_calls(&self) -> Vec<String> {
        self.cancel_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobBoardApi for FakeBoard {
    async fn search_jobs(&self, filter: &EffectiveFilter) -> Result<SearchResponse> {
        self.search_calls.lock().unwrap().push(filter.clone());
        let step = self.searches.lock().unwrap().pop_front();
        let listings = play(step, Vec::new()).await?;
        Ok(SearchResponse { listings })
    }

    async fn get_application_status(&self, job_id: &str) -> Result<ApplicationStatusResponse> {
        self.status_calls.lock().unwrap().push(job_id.to_string());
        let step = self
            .statuses
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(VecDeque::pop_front);
        play(step, ApplicationStatusResponse::default()).await
    }

    async fn toggle_bookmark(&self, job_id: &str) -> Result<SuccessResponse> {
        self.bookmark_calls.lock().unwrap().push(job_id.to_string());
        let step = self
            .bookmarks
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(VecDeque::pop_front);
        play(step, SuccessResponse { success: true }).await
    }

    async fn cancel_application(&self, application_id: &str) -> Result<SuccessResponse> {
        self.cancel_calls.lock().unwrap().push(application_id.to_string());
        let step = self.cancels.lock().unwrap().pop_front();
        play(step, SuccessResponse { success: true }).await
    }

    async fn list_bookmarks(&self) -> Result<FavoritesResponse> {
        let ids = self.favorites.lock().unwrap().clone();
        Ok(FavoritesResponse { ids })
    }
}

pub fn listing(id: &str) -> JobListing {
    JobListing::new(id, format!("Job {id}"), "Acme")
}

pub fn applied(application_id: &str) -> ApplicationStatusResponse {
    ApplicationStatusResponse {
        has_applied: true,
        application: Some(ApplicationRecord {
            id: application_id.to_string(),
            status: ApplicationStatus::Pending,
            applied_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
        }),
    }
}

pub fn not_applied() -> ApplicationStatusResponse {
    ApplicationStatusResponse::default()
}

pub fn network_error() -> JobsiftError {
    JobsiftError::Network("connection reset".to_string())
}

/// Lets spawned tasks that are ready run to their next suspension point.
pub async fn yield_now() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
