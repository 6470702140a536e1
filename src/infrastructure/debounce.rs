//! Quiet-period debouncer on top of the tokio timer.
//!
//! A [`Debouncer`] coalesces a burst of values into the last one, emitted once
//! the input has been stable for the whole delay. Each push restarts the
//! timer. Dropping the debouncer (or calling [`Debouncer::cancel`]) aborts any
//! pending emission, so nothing fires after disposal.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

type Emit<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Debounces values of type `T` into a callback.
///
/// A zero delay degrades to synchronous passthrough: [`push`](Self::push)
/// invokes the callback before returning.
pub struct Debouncer<T> {
    delay: Duration,
    emit: Emit<T>,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Creates a debouncer that calls `emit` with each settled value.
    pub fn new<F>(delay: Duration, emit: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            emit: Arc::new(emit),
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Whether values pass straight through without a timer.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.delay.is_zero()
    }

    /// Feeds a new input value, superseding any value still waiting.
    ///
    /// Must be called from within a tokio runtime unless the debouncer is a
    /// passthrough.
    pub fn push(&mut self, value: T) {
        self.cancel();

        if self.is_passthrough() {
            (self.emit)(value);
            return;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let current = Arc::clone(&self.generation);
        let emit = Arc::clone(&self.emit);
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // a push that raced with the timer wins
            if current.load(Ordering::SeqCst) == generation {
                emit(value);
            }
        }));
    }

    /// Drops the pending value, if any, without emitting it.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a value is waiting for its quiet period to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}
