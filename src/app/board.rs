//! Composition root of the discovery engine.

use crate::api::{Gateway, JobBoardApi};
use crate::applications::{ApplicationStatuses, StatusMount};
use crate::bookmarks::BookmarkStore;
use crate::domain::notice::{self, Notice};
use crate::domain::Result;
use crate::search::{SearchSession, SearchState};
use crate::ui::{Presenter, ViewListing};
use crate::Config;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// One screen's worth of job discovery: search, bookmarks and per-card
/// application statuses sharing a gateway and a notice channel.
pub struct JobBoard {
    search: SearchSession,
    bookmarks: BookmarkStore,
    statuses: ApplicationStatuses,
    presenter: Mutex<Presenter>,
    notices: Option<mpsc::Receiver<Notice>>,
}

impl JobBoard {
    /// Builds the engine over `api`. Must be called within a tokio runtime.
    #[must_use]
    pub fn new(config: &Config, api: Arc<dyn JobBoardApi>) -> Self {
        let gateway = Gateway::new(api, config.request_timeout());
        let (tx, rx) = notice::channel();

        tracing::debug!(
            debounce_ms = config.debounce_ms,
            timeout = ?config.request_timeout(),
            clear_results_on_error = config.clear_results_on_error,
            "job board created"
        );

        Self {
            search: SearchSession::with_notices(
                gateway.clone(),
                config.debounce(),
                config.clear_results_on_error,
                tx.clone(),
            ),
            bookmarks: BookmarkStore::with_notices(gateway.clone(), tx.clone()),
            statuses: ApplicationStatuses::with_notices(gateway, tx),
            presenter: Mutex::new(Presenter::new()),
            notices: Some(rx),
        }
    }

    #[must_use]
    pub const fn search(&self) -> &SearchSession {
        &self.search
    }

    #[must_use]
    pub const fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    #[must_use]
    pub const fn statuses(&self) -> &ApplicationStatuses {
        &self.statuses
    }

    /// Loads server bookmarks and runs the initial search.
    ///
    /// A failed bookmark load is logged and leaves the set empty; search
    /// failures surface through the search state.
    pub async fn open(&self) -> SearchState {
        if let Err(e) = self.bookmarks.load().await {
            tracing::debug!(error = %e, "bookmark hydration failed");
        }
        self.search.refresh();
        self.search.settled().await
    }

    /// Current rows, memoized on result identity and bookmark version.
    #[must_use]
    pub fn present(&self) -> Arc<[ViewListing]> {
        let results = Arc::clone(self.search.snapshot().results());
        let bookmarks = self.bookmarks.snapshot();
        self.presenter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .present(&results, &bookmarks)
    }

    /// See [`BookmarkStore::toggle`].
    pub fn toggle_bookmark(&self, job_id: &str) -> impl Future<Output = bool> + Send + 'static {
        self.bookmarks.toggle(job_id)
    }

    /// See [`ApplicationStatuses::mount`].
    #[must_use]
    pub fn mount_status(&self, job_id: &str) -> StatusMount {
        self.statuses.mount(job_id)
    }

    /// See [`ApplicationStatuses::cancel_application`].
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the cached entry is left unchanged.
    pub async fn cancel_application(&self, application_id: &str) -> Result<()> {
        self.statuses.cancel_application(application_id).await
    }

    /// Hands out the notice receiver. Only the first call gets it.
    ///
    /// Until it is drained, at most [`NOTICE_CAPACITY`](crate::domain::NOTICE_CAPACITY)
    /// notices are kept; later ones are dropped.
    pub fn take_notices(&mut self) -> Option<mpsc::Receiver<Notice>> {
        self.notices.take()
    }

    /// Disposes every component; in-flight responses are ignored from now on.
    pub fn dispose(&self) {
        self.search.dispose();
        self.bookmarks.dispose();
        self.statuses.dispose();
        tracing::debug!("job board disposed");
    }
}

impl Drop for JobBoard {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for JobBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobBoard")
            .field("search", &self.search)
            .field("bookmarks", &self.bookmarks)
            .field("statuses", &self.statuses)
            .finish_non_exhaustive()
    }
}
