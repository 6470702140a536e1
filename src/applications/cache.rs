//! Shared application-status cache with per-mount liveness tokens.
//!
//! The cache is the single owner of every [`ApplicationStatusEntry`]. Cards
//! read entries synchronously by job id; only the cache writes them.
//!
//! # Liveness
//!
//! Each mounted card holds a [`MountToken`]. Each status request carries a
//! request id and is owned by exactly one live mount. A response is applied
//! only if its request id is still the one pending on the slot and the owning
//! mount is still live. Unmounting the owner of a loading slot discards the
//! slot, or hands the fetch to another live mount of the same job with a
//! fresh request id, so a response from the unmounted card can never be
//! mistaken for fresh data.
//!
//! Resolved entries are memoized for the session and only leave the cache
//! through [`StatusCache::invalidate`] or a cancellation.

use crate::api::ApplicationStatusResponse;
use crate::domain::{ApplicationRecord, ApplicationStatusEntry, ErrorInfo};
use std::collections::HashMap;

/// Identifies one mount of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountToken(u64);

/// A status request the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetch {
    pub request: u64,
    pub owner: MountToken,
    pub job_id: String,
}

/// What happened to a response handed to [`StatusCache::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Fresh,
    Stale,
}

#[derive(Debug, Clone)]
struct Pending {
    request: u64,
    owner: MountToken,
}

#[derive(Debug, Clone)]
struct Slot {
    entry: ApplicationStatusEntry,
    pending: Option<Pending>,
}

/// Status entries keyed by job id, plus the registry of live mounts.
#[derive(Debug, Default)]
pub struct StatusCache {
    slots: HashMap<String, Slot>,
    mounts: HashMap<MountToken, String>,
    next_id: u64,
}

impl StatusCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn is_live(&self, token: MountToken) -> bool {
        self.mounts.contains_key(&token)
    }

    /// Starts a fetch for `job_id` owned by `owner`, marking the slot loading.
    fn start_fetch(&mut self, job_id: &str, owner: MountToken) -> Fetch {
        let request = self.next();
        self.slots.insert(
            job_id.to_string(),
            Slot {
                entry: ApplicationStatusEntry::loading(),
                pending: Some(Pending { request, owner }),
            },
        );
        Fetch {
            request,
            owner,
            job_id: job_id.to_string(),
        }
    }

    /// Registers a card for `job_id`.
    ///
    /// Returns the card's token and, unless a resolved entry is memoized or a
    /// live mount is already loading it, the fetch to perform.
    pub fn mount(&mut self, job_id: &str) -> (MountToken, Option<Fetch>) {
        let token = MountToken(self.next());
        self.mounts.insert(token, job_id.to_string());

        let reusable = self.slots.get(job_id).is_some_and(|slot| {
            slot.entry.is_resolved()
                || slot
                    .pending
                    .as_ref()
                    .is_some_and(|pending| self.is_live(pending.owner))
        });

        if reusable {
            (token, None)
        } else {
            (token, Some(self.start_fetch(job_id, token)))
        }
    }

    /// Unregisters a card.
    ///
    /// If the card owned a pending request, that request is orphaned. Another
    /// live card of the same job inherits a fresh fetch, which is returned.
    pub fn unmount(&mut self, token: MountToken) -> Option<Fetch> {
        let job_id = self.mounts.remove(&token)?;

        let owned_pending = self
            .slots
            .get(&job_id)
            .and_then(|slot| slot.pending.as_ref())
            .is_some_and(|pending| pending.owner == token);
        if !owned_pending {
            return None;
        }

        let heir = self
            .mounts
            .iter()
            .filter(|(_, id)| **id == job_id)
            .map(|(t, _)| *t)
            .min();

        if let Some(heir) = heir {
            Some(self.start_fetch(&job_id, heir))
        } else {
            self.slots.remove(&job_id);
            None
        }
    }

    /// Applies a response if its request is still pending and its owner live.
    pub fn complete(
        &mut self,
        fetch: &Fetch,
        outcome: Result<ApplicationStatusResponse, ErrorInfo>,
    ) -> Applied {
        let owner_live = self.mounts.get(&fetch.owner).is_some_and(|id| *id == fetch.job_id);
        let Some(slot) = self.slots.get_mut(&fetch.job_id) else {
            return Applied::Stale;
        };
        let current = slot
            .pending
            .as_ref()
            .is_some_and(|pending| pending.request == fetch.request);
        if !owner_live || !current {
            return Applied::Stale;
        }

        slot.pending = None;
        slot.entry = match outcome {
            Ok(response) => ApplicationStatusEntry::resolved(response.has_applied, response.application),
            Err(error) => ApplicationStatusEntry::failed(error),
        };
        Applied::Fresh
    }

    /// Re-fetches a failed entry on behalf of `token`.
    pub fn retry(&mut self, token: MountToken) -> Option<Fetch> {
        let job_id = self.mounts.get(&token)?.clone();
        let failed = self
            .slots
            .get(&job_id)
            .is_some_and(|slot| slot.pending.is_none() && !slot.entry.is_resolved());
        failed.then(|| self.start_fetch(&job_id, token))
    }

    /// Drops the memoized entry for `job_id`.
    ///
    /// Any pending request is orphaned. If cards of that job are mounted, a
    /// fresh fetch owned by one of them is returned.
    pub fn invalidate(&mut self, job_id: &str) -> Option<Fetch> {
        self.slots.remove(job_id);
        let heir = self
            .mounts
            .iter()
            .filter(|(_, id)| id.as_str() == job_id)
            .map(|(t, _)| *t)
            .min()?;
        Some(self.start_fetch(job_id, heir))
    }

    /// Records a successful submission, superseding any pending request.
    pub fn record_submission(&mut self, job_id: &str, application: ApplicationRecord) {
        self.slots.insert(
            job_id.to_string(),
            Slot {
                entry: ApplicationStatusEntry::resolved(true, Some(application)),
                pending: None,
            },
        );
    }

    /// Marks the application `application_id` withdrawn.
    ///
    /// Returns the job id whose entry changed, if the application is cached.
    pub fn mark_cancelled(&mut self, application_id: &str) -> Option<String> {
        let (job_id, slot) = self.slots.iter_mut().find(|(_, slot)| {
            slot.entry
                .application
                .as_ref()
                .is_some_and(|app| app.id == application_id)
        })?;
        slot.entry.has_applied = false;
        slot.entry.application = None;
        Some(job_id.clone())
    }

    /// Entry currently cached for `job_id`.
    #[must_use]
    pub fn entry(&self, job_id: &str) -> Option<&ApplicationStatusEntry> {
        self.slots.get(job_id).map(|slot| &slot.entry)
    }

    /// Job id the mount `token` shows, if it is still live.
    #[must_use]
    pub fn job_of(&self, token: MountToken) -> Option<&str> {
        self.mounts.get(&token).map(String::as_str)
    }

    /// Number of live mounts across all jobs.
    #[must_use]
    pub fn live_mounts(&self) -> usize {
        self.mounts.len()
    }
}
