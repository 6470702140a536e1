//! Async side of the application status resolver.
//!
//! [`ApplicationStatuses`] owns the shared [`StatusCache`] and performs the
//! fetches it asks for. Each rendered card holds a [`StatusMount`]; dropping
//! the mount is the unmount.

use super::cache::{Applied, Fetch, MountToken, StatusCache};
use crate::api::Gateway;
use crate::domain::notice::{self, Notice, NoticeSender};
use crate::domain::{ApplicationRecord, ApplicationStatusEntry, ErrorInfo, JobsiftError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::Instrument;

struct Inner {
    cache: Mutex<StatusCache>,
    gateway: Gateway,
    /// Bumped on every visible cache change.
    changes: watch::Sender<u64>,
    notices: Option<NoticeSender>,
    disposed: AtomicBool,
    /// Runtime current at construction; fetches spawn here even when a mount
    /// is dropped outside it.
    runtime: Option<Handle>,
}

/// Shared per-session application status cache.
///
/// Cloning yields another handle to the same cache. Fetches run as tasks on the
/// runtime the cache was built in. Without any runtime a fetch fails at once
/// with a retryable-by-hand error instead of loading forever.
#[derive(Clone)]
pub struct ApplicationStatuses {
    inner: Arc<Inner>,
}

impl ApplicationStatuses {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self::build(gateway, None)
    }

    /// Like [`new`](Self::new), additionally reporting failed cancellations.
    #[must_use]
    pub fn with_notices(gateway: Gateway, notices: NoticeSender) -> Self {
        Self::build(gateway, Some(notices))
    }

    fn build(gateway: Gateway, notices: Option<NoticeSender>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                cache: Mutex::new(StatusCache::new()),
                gateway,
                changes,
                notices,
                disposed: AtomicBool::new(false),
                runtime: Handle::try_current().ok(),
            }),
        }
    }

    /// Mounts a card for `job_id`, fetching its status unless already cached.
    #[must_use]
    pub fn mount(&self, job_id: &str) -> StatusMount {
        let (token, fetch) = self.inner.cache().mount(job_id);
        tracing::debug!(job_id = job_id, mount = ?token, fetching = fetch.is_some(), "status card mounted");
        if let Some(fetch) = fetch {
            self.inner.notify();
            self.inner.spawn_fetch(fetch);
        }
        StatusMount {
            inner: Arc::clone(&self.inner),
            token,
            job_id: job_id.to_string(),
        }
    }

    /// Shared synchronous read of the entry for `job_id`.
    ///
    /// Jobs with no mounted card and no memoized status read as idle.
    #[must_use]
    pub fn entry(&self, job_id: &str) -> ApplicationStatusEntry {
        self.inner.entry(job_id)
    }

    /// Drops the memoized status of `job_id`, re-fetching for mounted cards.
    pub fn invalidate(&self, job_id: &str) {
        let fetch = self.inner.cache().invalidate(job_id);
        tracing::debug!(job_id = job_id, refetching = fetch.is_some(), "status invalidated");
        self.inner.notify();
        if let Some(fetch) = fetch {
            self.inner.spawn_fetch(fetch);
        }
    }

    /// Writes back a successful submission made elsewhere.
    pub fn record_submission(&self, job_id: &str, application: ApplicationRecord) {
        tracing::debug!(job_id = job_id, application_id = %application.id, "submission recorded");
        self.inner.cache().record_submission(job_id, application);
        self.inner.notify();
    }

    /// Withdraws the application `application_id`.
    ///
    /// On success every card showing that application sees `has_applied`
    /// turn false and the application cleared.
    ///
    /// # Errors
    ///
    /// Returns the gateway error, or [`JobsiftError::Disposed`]. The cached
    /// entry is left unchanged and a [`Notice::CancellationFailed`] is emitted.
    pub async fn cancel_application(&self, application_id: &str) -> Result<()> {
        let span = tracing::debug_span!("cancel_application", application_id = application_id);
        async {
            let outcome = if self.inner.is_disposed() {
                Err(JobsiftError::Disposed)
            } else {
                self.inner.gateway.cancel_application(application_id).await
            };

            match outcome {
                Ok(()) => {
                    let job_id = self.inner.cache().mark_cancelled(application_id);
                    tracing::debug!(job_id = ?job_id, "application cancelled");
                    if job_id.is_some() {
                        self.inner.notify();
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::debug!(error = %e, "cancellation failed, entry unchanged");
                    notice::emit(
                        self.inner.notices.as_ref(),
                        Notice::CancellationFailed {
                            application_id: application_id.to_string(),
                            error: ErrorInfo::from(&e),
                        },
                    );
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Receives a tick on every cache change; read entries after each tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    /// Stops applying responses and refuses further cancellations.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::SeqCst) {
            tracing::debug!("application statuses disposed");
        }
    }
}

impl Inner {
    fn cache(&self) -> MutexGuard<'_, StatusCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn notify(&self) {
        self.changes.send_modify(|n| *n += 1);
    }

    fn entry(&self, job_id: &str) -> ApplicationStatusEntry {
        self.cache().entry(job_id).cloned().unwrap_or_default()
    }

    fn spawn_fetch(self: &Arc<Self>, fetch: Fetch) {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::debug!(job_id = %fetch.job_id, "no runtime for status request");
            self.complete(&fetch, Err(ErrorInfo::from(&JobsiftError::NoRuntime)));
            return;
        };
        let weak = Arc::downgrade(self);
        let gateway = self.gateway.clone();
        let span = tracing::debug_span!("status_request", job_id = %fetch.job_id, request = fetch.request);

        runtime.spawn(
            async move {
                let outcome = gateway
                    .application_status(&fetch.job_id)
                    .await
                    .map_err(ErrorInfo::from);
                if let Some(inner) = weak.upgrade() {
                    inner.complete(&fetch, outcome);
                }
            }
            .instrument(span),
        );
    }

    fn complete(
        &self,
        fetch: &Fetch,
        outcome: std::result::Result<crate::api::ApplicationStatusResponse, ErrorInfo>,
    ) {
        if self.is_disposed() {
            tracing::debug!("statuses disposed, dropping status response");
            return;
        }
        let failed = outcome.is_err();
        let applied = self.cache().complete(fetch, outcome);
        match applied {
            Applied::Fresh => {
                tracing::debug!(failed = failed, "status applied");
                self.notify();
            }
            Applied::Stale => tracing::debug!("stale status response discarded"),
        }
    }

    fn unmount(self: &Arc<Self>, token: MountToken) {
        let fetch = self.cache().unmount(token);
        tracing::debug!(mount = ?token, handed_over = fetch.is_some(), "status card unmounted");
        self.notify();
        if let Some(fetch) = fetch {
            self.spawn_fetch(fetch);
        }
    }
}

impl std::fmt::Debug for ApplicationStatuses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationStatuses")
            .field("live_mounts", &self.inner.cache().live_mounts())
            .field("disposed", &self.inner.is_disposed())
            .finish_non_exhaustive()
    }
}

/// One rendered card's hold on a job's status entry.
///
/// The mount is live until dropped. A response requested on its behalf that
/// arrives after the drop is discarded.
pub struct StatusMount {
    inner: Arc<Inner>,
    token: MountToken,
    job_id: String,
}

impl StatusMount {
    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    #[must_use]
    pub fn token(&self) -> MountToken {
        self.token
    }

    /// Current entry of this card's job.
    #[must_use]
    pub fn entry(&self) -> ApplicationStatusEntry {
        self.inner.entry(&self.job_id)
    }

    /// Re-fetches after an error. No-op in any other state.
    pub fn retry(&self) {
        let fetch = self.inner.cache().retry(self.token);
        if let Some(fetch) = fetch {
            tracing::debug!(job_id = %self.job_id, "status retry");
            self.inner.notify();
            self.inner.spawn_fetch(fetch);
        }
    }
}

impl Drop for StatusMount {
    fn drop(&mut self) {
        self.inner.unmount(self.token);
    }
}

impl std::fmt::Debug for StatusMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusMount")
            .field("job_id", &self.job_id)
            .field("token", &self.token)
            .finish()
    }
}
