//! Optimistic bookmark (favorite) store.
//!
//! [`BookmarkStore::toggle`] flips membership before the remote write starts
//! and undoes exactly that flip if the write fails. Writes for the same job id
//! are chained in call order, each waiting for the previous one to settle, so
//! the server sees them in the order the user made them. Writes for different ids never wait on each other.

use crate::api::Gateway;
use crate::domain::notice::{self, Notice, NoticeSender};
use crate::domain::{ErrorInfo, Result};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{oneshot, watch};
use tracing::Instrument;

/// Snapshot of the bookmarked ids.
///
/// `version` increases on every change and is the cheap equality key used by
/// the presenter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkSet {
    pub ids: Arc<HashSet<String>>,
    pub version: u64,
}

impl BookmarkSet {
    #[must_use]
    pub fn contains(&self, job_id: &str) -> bool {
        self.ids.contains(job_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Last queued write of a job id; the next write waits on `done`.
struct Tail {
    ticket: u64,
    done: oneshot::Receiver<()>,
}

/// One write's place in its job's queue.
struct Turn {
    ticket: u64,
    previous: Option<oneshot::Receiver<()>>,
    done: oneshot::Sender<()>,
}

struct Inner {
    set: watch::Sender<BookmarkSet>,
    gateway: Gateway,
    lanes: Mutex<HashMap<String, Tail>>,
    tickets: AtomicU64,
    notices: Option<NoticeSender>,
    disposed: AtomicBool,
}

/// Process-lifetime set of favorited job ids.
///
/// Cloning yields another handle to the same store; the store is the only
/// writer of the set.
#[derive(Clone)]
pub struct BookmarkStore {
    inner: Arc<Inner>,
}

impl BookmarkStore {
    /// Creates an empty store writing through `gateway`.
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self::build(gateway, None)
    }

    /// Like [`new`](Self::new), additionally reporting rollbacks as notices.
    #[must_use]
    pub fn with_notices(gateway: Gateway, notices: NoticeSender) -> Self {
        Self::build(gateway, Some(notices))
    }

    fn build(gateway: Gateway, notices: Option<NoticeSender>) -> Self {
        let (set, _) = watch::channel(BookmarkSet::default());
        Self {
            inner: Arc::new(Inner {
                set,
                gateway,
                lanes: Mutex::new(HashMap::new()),
                tickets: AtomicU64::new(0),
                notices,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Replaces the set with ids known from elsewhere (e.g. the server).
    pub fn hydrate<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: HashSet<String> = ids.into_iter().map(Into::into).collect();
        tracing::debug!(bookmark_count = ids.len(), "bookmarks hydrated");
        self.inner.set.send_modify(|set| {
            set.ids = Arc::new(ids);
            set.version += 1;
        });
    }

    /// Loads the server's favorites into the store.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the store is left unchanged.
    pub async fn load(&self) -> Result<()> {
        let ids = self.inner.gateway.bookmarks().await?;
        self.hydrate(ids);
        Ok(())
    }

    /// Synchronous membership read.
    #[must_use]
    pub fn is_bookmarked(&self, job_id: &str) -> bool {
        self.inner.set.borrow().contains(job_id)
    }

    #[must_use]
    pub fn snapshot(&self) -> BookmarkSet {
        self.inner.set.borrow().clone()
    }

    /// Receives every membership change, optimistic flips and rollbacks alike.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BookmarkSet> {
        self.inner.set.subscribe()
    }

    /// Toggles `job_id`.
    ///
    /// The flip is applied and observable before this method returns. The
    /// remote write, and the undo on failure, run as a spawned task, so they
    /// settle even if the returned future is dropped. The future resolves to
    /// `true` on success and to `false` once the flip has been undone.
    ///
    /// Must be called within a tokio runtime.
    pub fn toggle(&self, job_id: &str) -> impl Future<Output = bool> + Send + 'static {
        let job_id = job_id.to_string();

        let write = if self.inner.disposed.load(Ordering::SeqCst) {
            tracing::debug!(job_id = %job_id, "bookmark store disposed, toggle ignored");
            None
        } else {
            let now = self.inner.flip(&job_id);
            tracing::debug!(job_id = %job_id, bookmarked = now, "bookmark flipped optimistically");
            let turn = self.inner.enqueue(&job_id);
            let span = tracing::debug_span!("bookmark_toggle", job_id = %job_id, ticket = turn.ticket);
            let inner = Arc::clone(&self.inner);
            Some(tokio::spawn(inner.write(job_id, turn).instrument(span)))
        };

        async move {
            match write {
                Some(handle) => handle.await.unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "bookmark write task failed");
                    false
                }),
                None => false,
            }
        }
    }

    /// Stops accepting toggles. Writes already started still settle.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
    }
}

impl Inner {
    /// Performs the remote write for an already applied flip, undoing it on
    /// failure.
    async fn write(self: Arc<Self>, job_id: String, turn: Turn) -> bool {
        if let Some(previous) = turn.previous {
            // a dropped sender means the earlier write is over as well
            let _ = previous.await;
        }
        let outcome = self.gateway.toggle_bookmark(&job_id).await;

        let confirmed = match outcome {
            Ok(()) => {
                tracing::debug!("bookmark write confirmed");
                true
            }
            Err(e) => {
                let restored = self.flip(&job_id);
                tracing::debug!(error = %e, bookmarked = restored, "bookmark write failed, flip undone");
                notice::emit(
                    self.notices.as_ref(),
                    Notice::BookmarkRolledBack {
                        job_id: job_id.clone(),
                        error: ErrorInfo::from(&e),
                    },
                );
                false
            }
        };

        self.release(&job_id, turn.ticket);
        let _ = turn.done.send(());
        confirmed
    }

    /// Flips membership and returns the new state.
    fn flip(&self, job_id: &str) -> bool {
        let mut now = false;
        self.set.send_modify(|set| {
            let ids = Arc::make_mut(&mut set.ids);
            now = if ids.remove(job_id) {
                false
            } else {
                ids.insert(job_id.to_string());
                true
            };
            set.version += 1;
        });
        now
    }

    /// Queues a write for `job_id` behind any write already queued for it.
    fn enqueue(&self, job_id: &str) -> Turn {
        let (done, rx) = oneshot::channel();
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst);
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = lanes
            .insert(job_id.to_string(), Tail { ticket, done: rx })
            .map(|tail| tail.done);
        Turn {
            ticket,
            previous,
            done,
        }
    }

    /// Forgets the queue of `job_id` unless a later write joined it.
    fn release(&self, job_id: &str, ticket: u64) {
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        if lanes.get(job_id).is_some_and(|tail| tail.ticket == ticket) {
            lanes.remove(job_id);
        }
    }
}

impl std::fmt::Debug for BookmarkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = self.inner.set.borrow();
        f.debug_struct("BookmarkStore")
            .field("count", &set.len())
            .field("version", &set.version)
            .finish_non_exhaustive()
    }
}
