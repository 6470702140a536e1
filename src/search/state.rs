//! Pure search state and request sequencing.
//!
//! [`SearchState`] owns the query text, the debounced text, the facets and the
//! last applied results. It knows nothing about timers or the network: the
//! session asks it to [`begin`](SearchState::begin) a request, performs the
//! call, and hands the outcome back through [`settle`](SearchState::settle).
//!
//! # Sequencing
//!
//! Every request gets a sequence number from a monotonically increasing
//! counter. Only the most recently issued request may settle visible state;
//! any other response is discarded without touching results, error or phase.
//! Because of that rule the phase stays [`SearchPhase::Searching`] for as long
//! as the newest request is outstanding, however many older ones land in the
//! meantime.

use crate::domain::{ErrorInfo, FacetSelection, JobListing};
use crate::filter::{compose, EffectiveFilter};
use std::sync::Arc;

/// Lifecycle of the search session. Re-entrant: any settled phase moves back
/// to `Searching` on the next change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    Settled,
    Failed,
}

/// Results of one applied search, together with the filter that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub filter: EffectiveFilter,
    pub listings: Vec<JobListing>,
}

/// What happened to a response handed to [`SearchState::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The response belonged to the newest request and is now visible.
    Applied,
    /// The response was superseded and dropped silently.
    Discarded,
}

/// Central search state container.
#[derive(Debug, Clone)]
pub struct SearchState {
    query_text: String,
    debounced_text: String,
    facets: FacetSelection,
    phase: SearchPhase,
    results: Arc<SearchResults>,
    error: Option<ErrorInfo>,
    latest_seq: u64,
    issued_filter: Option<EffectiveFilter>,
    clear_on_error: bool,
}

impl SearchState {
    /// Creates an idle state with no results.
    ///
    /// With `clear_on_error` set, a failed search also empties the result list
    /// instead of leaving the last good results visible.
    #[must_use]
    pub fn new(clear_on_error: bool) -> Self {
        Self {
            query_text: String::new(),
            debounced_text: String::new(),
            facets: FacetSelection::default(),
            phase: SearchPhase::Idle,
            results: Arc::new(SearchResults::default()),
            error: None,
            latest_seq: 0,
            issued_filter: None,
            clear_on_error,
        }
    }

    /// Raw, undebounced input as last typed.
    #[must_use]
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// Input after the quiet period, the text searches are built from.
    #[must_use]
    pub fn debounced_text(&self) -> &str {
        &self.debounced_text
    }

    #[must_use]
    pub const fn facets(&self) -> &FacetSelection {
        &self.facets
    }

    #[must_use]
    pub const fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// True from the moment a request is issued until the newest one settles.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    /// Last applied results. The `Arc` identity changes only when new results
    /// are applied, which the presenter relies on for memoization.
    #[must_use]
    pub const fn results(&self) -> &Arc<SearchResults> {
        &self.results
    }

    /// Error of the last failed search, until dismissed or superseded.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Sequence number of the most recently issued request, 0 before any.
    #[must_use]
    pub const fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// The filter the current text and facets compose to.
    #[must_use]
    pub fn effective_filter(&self) -> EffectiveFilter {
        compose(&self.debounced_text, &self.facets)
    }

    pub fn set_query_text(&mut self, text: String) {
        self.query_text = text;
    }

    /// Records a settled debounced text. Returns whether it changed.
    pub fn set_debounced_text(&mut self, text: String) -> bool {
        if self.debounced_text == text {
            return false;
        }
        self.debounced_text = text;
        true
    }

    /// Replaces the facets. Returns whether they changed.
    pub fn set_facets(&mut self, facets: FacetSelection) -> bool {
        if self.facets == facets {
            return false;
        }
        self.facets = facets;
        true
    }

    /// Issues a new request if the effective filter changed since the last
    /// issued one, or unconditionally when `force` is set (manual refresh).
    ///
    /// Returns the request's sequence number and filter.
    pub fn begin(&mut self, force: bool) -> Option<(u64, EffectiveFilter)> {
        let filter = self.effective_filter();
        if !force && self.issued_filter.as_ref() == Some(&filter) {
            tracing::trace!("effective filter unchanged, no request issued");
            return None;
        }

        self.latest_seq += 1;
        self.issued_filter = Some(filter.clone());
        self.phase = SearchPhase::Searching;
        Some((self.latest_seq, filter))
    }

    /// Applies the outcome of request `seq` if it is the newest one.
    pub fn settle(&mut self, seq: u64, outcome: Result<Vec<JobListing>, ErrorInfo>) -> Settlement {
        if seq != self.latest_seq {
            return Settlement::Discarded;
        }

        let filter = self.issued_filter.clone().unwrap_or_default();
        match outcome {
            Ok(listings) => {
                self.results = Arc::new(SearchResults { filter, listings });
                self.error = None;
                self.phase = SearchPhase::Settled;
            }
            Err(error) => {
                if self.clear_on_error {
                    self.results = Arc::new(SearchResults {
                        filter,
                        listings: Vec::new(),
                    });
                }
                self.error = Some(error);
                self.phase = SearchPhase::Failed;
            }
        }
        Settlement::Applied
    }

    /// Hides the failure banner. Results and phase are left as they are.
    pub fn dismiss_error(&mut self) -> bool {
        self.error.take().is_some()
    }
}
