//! Async search orchestrator.
//!
//! A [`SearchSession`] wires the debouncer, the pure [`SearchState`] and the
//! gateway together:
//!
//! ```text
//! set_query_text ─► Debouncer ─► debounced text ─┐
//! apply_filters / toggle_facet / clear_filters ──┼─► SearchState::begin ─► spawn request
//! refresh / retry ───────────────────────────────┘                             │
//!            watch subscribers ◄── SearchState::settle ◄── response (seq) ◄─────┘
//! ```
//!
//! Requests are never aborted. A superseded request runs to completion and its
//! response is discarded by sequence number.

use super::state::{SearchState, Settlement};
use crate::api::Gateway;
use crate::domain::notice::{self, Notice, NoticeSender};
use crate::domain::{ErrorInfo, FacetSelection, FacetValue, JobListing, Result};
use crate::filter::{self, EffectiveFilter};
use crate::infrastructure::Debouncer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

struct Inner {
    state: watch::Sender<SearchState>,
    gateway: Gateway,
    debouncer: Mutex<Option<Debouncer<String>>>,
    notices: Option<NoticeSender>,
    disposed: AtomicBool,
}

/// One search screen's worth of state and in-flight requests.
///
/// Cloning yields another handle to the same session. Must be used from
/// within a tokio runtime: requests and debounce timers are spawned tasks.
#[derive(Clone)]
pub struct SearchSession {
    inner: Arc<Inner>,
}

impl SearchSession {
    /// Creates an idle session. No request is issued until the first change
    /// or [`refresh`](Self::refresh).
    #[must_use]
    pub fn new(gateway: Gateway, debounce: Duration, clear_on_error: bool) -> Self {
        Self::build(gateway, debounce, clear_on_error, None)
    }

    /// Like [`new`](Self::new), additionally reporting failures as notices.
    #[must_use]
    pub fn with_notices(
        gateway: Gateway,
        debounce: Duration,
        clear_on_error: bool,
        notices: NoticeSender,
    ) -> Self {
        Self::build(gateway, debounce, clear_on_error, Some(notices))
    }

    fn build(
        gateway: Gateway,
        debounce: Duration,
        clear_on_error: bool,
        notices: Option<NoticeSender>,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let debouncer = Debouncer::new(debounce, move |text: String| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_debounced(text);
                }
            });
            let (state, _) = watch::channel(SearchState::new(clear_on_error));
            Inner {
                state,
                gateway,
                debouncer: Mutex::new(Some(debouncer)),
                notices,
                disposed: AtomicBool::new(false),
            }
        });
        Self { inner }
    }

    /// Records raw input; a search follows once it settles.
    pub fn set_query_text(&self, text: impl Into<String>) {
        if self.inner.is_disposed() {
            return;
        }
        let text = text.into();
        tracing::trace!(query = %text, "query text updated");
        self.inner.state.send_modify(|state| state.set_query_text(text.clone()));

        let mut debouncer = self.inner.debouncer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(debouncer) = debouncer.as_mut() {
            debouncer.push(text);
        }
    }

    /// Applies `text` at once, skipping the quiet period (search on submit).
    pub fn submit_query(&self, text: impl Into<String>) {
        if self.inner.is_disposed() {
            return;
        }
        let text = text.into();
        if let Some(debouncer) = self
            .inner
            .debouncer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_mut()
        {
            debouncer.cancel();
        }
        self.inner.state.send_modify(|state| state.set_query_text(text.clone()));
        self.inner.on_debounced(text);
    }

    /// Applies `text` and `facets` together, skipping the quiet period.
    ///
    /// Issues at most one request, and none if the effective filter is
    /// unchanged.
    pub fn submit_search(&self, text: impl Into<String>, facets: FacetSelection) {
        if self.inner.is_disposed() {
            return;
        }
        let text = text.into();
        if let Some(debouncer) = self
            .inner
            .debouncer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_mut()
        {
            debouncer.cancel();
        }
        tracing::debug!(query = %text, "search submitted");
        let changed = self.inner.state.send_if_modified(|state| {
            state.set_query_text(text.clone());
            let text_changed = state.set_debounced_text(text);
            state.set_facets(facets) || text_changed
        });
        if changed {
            self.inner.begin(false);
        }
    }

    /// Replaces the applied facets, searching if the effective filter changed.
    pub fn apply_filters(&self, facets: FacetSelection) {
        self.inner.update_facets(|current| *current = facets);
    }

    /// Toggles one facet value.
    pub fn toggle_facet(&self, value: FacetValue) {
        self.inner.update_facets(|current| current.toggle(value));
    }

    /// Toggles a facet value addressed by name.
    ///
    /// # Errors
    ///
    /// Fails fast on an unknown facet name or an invalid value; the session is
    /// left untouched.
    pub fn toggle_facet_value(&self, facet_name: &str, value: &str) -> Result<()> {
        let next = filter::toggle_facet_value(self.inner.state.borrow().facets(), facet_name, value)?;
        self.apply_filters(next);
        Ok(())
    }

    /// Clears every facet. The free text is deliberately kept.
    pub fn clear_filters(&self) {
        self.inner.update_facets(|current| *current = FacetSelection::default());
    }

    /// Re-issues the current effective filter, even if unchanged.
    pub fn refresh(&self) {
        self.inner.begin(true);
    }

    /// Retry action of the failure banner; same as [`refresh`](Self::refresh).
    pub fn retry(&self) {
        self.refresh();
    }

    /// Hides the failure banner without re-searching.
    pub fn dismiss_error(&self) {
        self.inner.state.send_if_modified(SearchState::dismiss_error);
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Currently displayed listings.
    #[must_use]
    pub fn listings(&self) -> Vec<JobListing> {
        self.inner.state.borrow().results().listings.clone()
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.inner.state.borrow().is_searching()
    }

    /// The filter the next search would use.
    #[must_use]
    pub fn effective_filter(&self) -> EffectiveFilter {
        self.inner.state.borrow().effective_filter()
    }

    /// Receives every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Waits until no request is outstanding and returns that state.
    ///
    /// A pending debounce timer is not waited for.
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.inner.state.subscribe();
        let settled = rx.wait_for(|state| !state.is_searching()).await.map(|state| state.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    /// Tears the session down: pending debounce timers are cancelled and
    /// responses still in flight are ignored.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let debouncer = self
            .inner
            .debouncer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        drop(debouncer);
        tracing::debug!("search session disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl Inner {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn on_debounced(self: &Arc<Self>, text: String) {
        if self.is_disposed() {
            return;
        }
        tracing::debug!(query = %text, "debounced query settled");
        if self.state.send_if_modified(|state| state.set_debounced_text(text)) {
            self.begin(false);
        }
    }

    fn update_facets(self: &Arc<Self>, update: impl FnOnce(&mut FacetSelection)) {
        if self.is_disposed() {
            return;
        }
        let changed = self.state.send_if_modified(|state| {
            let mut facets = state.facets().clone();
            update(&mut facets);
            state.set_facets(facets)
        });
        if changed {
            self.begin(false);
        }
    }

    fn begin(self: &Arc<Self>, force: bool) {
        if self.is_disposed() {
            return;
        }
        let mut issued = None;
        self.state.send_if_modified(|state| {
            issued = state.begin(force);
            issued.is_some()
        });
        if let Some((seq, filter)) = issued {
            self.spawn_search(seq, filter);
        }
    }

    fn spawn_search(self: &Arc<Self>, seq: u64, filter: EffectiveFilter) {
        tracing::debug!(
            seq = seq,
            query = ?filter.query,
            active_filters = filter.active_count(),
            "search issued"
        );

        let weak = Arc::downgrade(self);
        let gateway = self.gateway.clone();
        let span = tracing::debug_span!("search_request", seq = seq);

        tokio::spawn(
            async move {
                let outcome = gateway.search(&filter).await.map_err(ErrorInfo::from);
                if let Some(inner) = weak.upgrade() {
                    inner.settle(seq, outcome);
                }
            }
            .instrument(span),
        );
    }

    fn settle(&self, seq: u64, outcome: std::result::Result<Vec<JobListing>, ErrorInfo>) {
        if self.is_disposed() {
            tracing::debug!(seq = seq, "session disposed, dropping search response");
            return;
        }

        let failure = outcome.as_ref().err().cloned();
        let count = outcome.as_ref().map_or(0, Vec::len);
        let mut settlement = Settlement::Discarded;
        self.state.send_if_modified(|state| {
            settlement = state.settle(seq, outcome);
            settlement == Settlement::Applied
        });

        match (settlement, failure) {
            (Settlement::Discarded, _) => {
                tracing::debug!(seq = seq, "stale search response discarded");
            }
            (Settlement::Applied, None) => {
                tracing::debug!(seq = seq, result_count = count, "search results applied");
            }
            (Settlement::Applied, Some(error)) => {
                tracing::debug!(seq = seq, error = %error.message, "search failed");
                notice::emit(self.notices.as_ref(), Notice::SearchFailed { error });
            }
        }
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SearchSession")
            .field("phase", &state.phase())
            .field("latest_seq", &state.latest_seq())
            .field("disposed", &self.inner.is_disposed())
            .finish_non_exhaustive()
    }
}
