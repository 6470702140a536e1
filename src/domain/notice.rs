//! Transient user notifications raised by the engine's components.
//!
//! Components push notices into a bounded channel; the UI decides how to
//! show them (banner, toast, confirmation dialog). While nobody drains the
//! channel, notices beyond [`NOTICE_CAPACITY`] are dropped.

use super::error::ErrorInfo;
use tokio::sync::mpsc;

/// A transient, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A search failed; previous results are still shown. Offers a retry.
    SearchFailed {
        error: ErrorInfo,
    },

    /// A bookmark write failed and the optimistic flip was undone.
    BookmarkRolledBack {
        job_id: String,
        error: ErrorInfo,
    },

    /// Withdrawing an application failed; nothing changed locally. Retrying
    /// should ask the user to confirm again.
    CancellationFailed {
        application_id: String,
        error: ErrorInfo,
    },
}

/// Notices kept while the receiver is not being drained.
pub const NOTICE_CAPACITY: usize = 32;

/// Sending half of the notice channel.
pub type NoticeSender = mpsc::Sender<Notice>;

/// Creates a notice channel holding at most [`NOTICE_CAPACITY`] notices.
#[must_use]
pub fn channel() -> (NoticeSender, mpsc::Receiver<Notice>) {
    mpsc::channel(NOTICE_CAPACITY)
}

/// Sends `notice` if a sink is attached. A full or closed channel is not an
/// error: the notice is dropped.
pub(crate) fn emit(sink: Option<&NoticeSender>, notice: Notice) {
    let Some(tx) = sink else {
        return;
    };
    match tx.try_send(notice) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(notice)) => {
            tracing::debug!(?notice, "notice queue full, notice dropped");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => tracing::trace!("notice receiver dropped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorInfo, JobsiftError};

    fn rolled_back(n: usize) -> Notice {
        Notice::BookmarkRolledBack {
            job_id: format!("job-{n}"),
            error: ErrorInfo::from(&JobsiftError::Network("offline".to_string())),
        }
    }

    #[test]
    fn undrained_queue_stops_growing_at_capacity() {
        let (tx, mut rx) = channel();
        for n in 0..NOTICE_CAPACITY * 3 {
            emit(Some(&tx), rolled_back(n));
        }

        let mut kept = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            kept.push(notice);
        }
        assert_eq!(kept.len(), NOTICE_CAPACITY);
        assert_eq!(kept[0], rolled_back(0));
    }

    #[test]
    fn closed_channel_is_ignored() {
        let (tx, rx) = channel();
        drop(rx);
        emit(Some(&tx), rolled_back(0));
        emit(None, rolled_back(1));
    }
}
