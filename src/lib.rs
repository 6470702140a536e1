//! Jobsift: job discovery and application-state reconciliation engine.
//!
//! Jobsift is the non-visual core of a job board client:
//! - Debounced free-text search merged with multi-facet filters
//! - Sequence-numbered search requests where late, superseded responses are dropped
//! - Optimistic bookmarks with exact rollback and per-job write ordering
//! - Per-card application status with a shared session cache and liveness tokens
//! - Memoized presentation of results joined with bookmark flags
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI driver (main.rs)                               │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← JobBoard
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ search/       │   │ bookmarks/    │   │ applications/ │
//! │ - sequencing  │   │ - optimistic  │   │ - status cache│
//! │ - debounce    │   │ - rollback    │   │ - mounts      │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  api/ (collaborator trait, gateway, REST adapter)   │
//! │  filter/ (composer, chips, query encoding)          │
//! │  ui/ (view models)                                  │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  domain/ · infrastructure/ · observability/         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Concurrency
//!
//! Everything runs on a tokio runtime. Shared state sits behind a
//! `watch::Sender` or a short-lived `std::sync::Mutex` that is never held
//! across an `.await`. Correctness rests on sequence numbers (search),
//! per-id write lanes (bookmarks) and liveness tokens (application status),
//! not on how tasks happen to be scheduled.
//!
//! # Configuration
//!
//! ```toml
//! api_base_url = "https://jobs.example.com/api"
//! api_token = "…"
//! debounce_ms = 400
//! request_timeout_secs = 30
//! clear_results_on_error = false
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use jobsift::{connect, Config, ContractType, FacetValue};
//!
//! # async fn run() -> jobsift::Result<()> {
//! let board = connect(&Config::default())?;
//! board.search().toggle_facet(FacetValue::ContractType(ContractType::FullTime));
//! board.search().submit_query("rust");
//! let state = board.search().settled().await;
//! for row in board.present().iter() {
//!     println!("{} {}", if row.is_favorite { "★" } else { " " }, row.listing.title);
//! }
//! # let _ = state;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod app;
pub mod applications;
pub mod bookmarks;
pub mod domain;
pub mod filter;
pub mod infrastructure;
pub mod search;
pub mod ui;

pub mod observability;

pub use api::{Gateway, JobBoardApi, RestJobBoard};
pub use app::JobBoard;
pub use applications::{ApplicationStatuses, StatusMount};
pub use bookmarks::{BookmarkSet, BookmarkStore};
pub use domain::{
    ApplicationState, ApplicationStatusEntry, ContractType, ErrorInfo, ErrorKind, ExperienceLevel,
    FacetName, FacetSelection, FacetValue, JobListing, JobsiftError, Notice, Result, WorkModality,
    NOTICE_CAPACITY,
};
pub use filter::{EffectiveFilter, FilterChip};
pub use search::{SearchPhase, SearchSession, SearchState};
pub use ui::{Presenter, ViewListing};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_DEBOUNCE_MS: u64 = 400;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Engine configuration.
///
/// Read from a TOML file with [`Config::from_file`] or from a string map
/// with [`Config::from_map`]. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the job board REST API. Default: `http://localhost:3000/api`
    pub api_base_url: String,

    /// Bearer token handed to the transport, if any.
    pub api_token: Option<String>,

    /// Quiet period before typed text triggers a search. `0` searches on
    /// every keystroke. Default: 400
    pub debounce_ms: u64,

    /// Per-request timeout. `0` disables it. Default: 30
    pub request_timeout_secs: u64,

    /// Empty the result list when a search fails instead of keeping the last
    /// good results visible. Default: `false`
    pub clear_results_on_error: bool,

    /// Tracing filter, e.g. `debug` or `jobsift=trace`. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            clear_results_on_error: false,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from a string map.
    ///
    /// Unparsable numbers fall back to their defaults. A negative debounce is
    /// clamped to `0` (search on every keystroke).
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use jobsift::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("debounce_ms".to_string(), "250".to_string());
    /// map.insert("clear_results_on_error".to_string(), "true".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.debounce_ms, 250);
    /// assert!(config.clear_results_on_error);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| map.get(key).map(|s| s.trim()).filter(|s| !s.is_empty());

        let debounce_ms = get("debounce_ms")
            .and_then(|s| s.parse::<i64>().ok())
            .map_or(defaults.debounce_ms, |ms| u64::try_from(ms).unwrap_or(0));

        let request_timeout_secs = get("request_timeout_secs")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let clear_results_on_error = get("clear_results_on_error")
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(defaults.clear_results_on_error);

        Self {
            api_base_url: get("api_base_url").map_or(defaults.api_base_url, str::to_string),
            api_token: get("api_token").map(str::to_string),
            debounce_ms,
            request_timeout_secs,
            clear_results_on_error,
            trace_level: get("trace_level").map(str::to_string),
        }
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`JobsiftError::Io`] if the file cannot be read and
    /// [`JobsiftError::Config`] if it is not valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| JobsiftError::Config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// `None` when timeouts are disabled.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }
}

/// Builds a [`JobBoard`] talking to the REST API named in `config`.
///
/// Must be called within a tokio runtime.
///
/// # Errors
///
/// Returns [`JobsiftError::Config`] if the base URL is invalid.
pub fn connect(config: &Config) -> Result<JobBoard> {
    let api = RestJobBoard::new(&config.api_base_url, config.api_token.clone())?;
    tracing::debug!(base_url = %config.api_base_url, "connecting to job board");
    Ok(JobBoard::new(config, Arc::new(api)))
}
