//! View models handed to rendering.
//!
//! A [`ViewListing`] is a [`JobListing`] joined with its bookmark flag and the
//! highlight ranges of the search text inside its title. Listings are never
//! mutated: the favorite flag lives on the view, not on the cached listing.
//!
//! # Memoization
//!
//! [`Presenter`] remembers the last join. Asking again with the same results
//! (by `Arc` identity) and the same bookmark version returns the same `Arc`,
//! so consumers can detect "nothing changed" with [`Arc::ptr_eq`].
//!
//! ```text
//! Arc<SearchResults> ─┐
//!                     ├─► Presenter::present ─► Arc<[ViewListing]>
//! BookmarkSet.version ┘
//! ```

use crate::bookmarks::BookmarkSet;
use crate::domain::JobListing;
use crate::search::SearchResults;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::sync::Arc;

/// One row of the rendered result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewListing {
    pub listing: Arc<JobListing>,

    /// Derived from the bookmark set at presentation time.
    pub is_favorite: bool,

    /// Character ranges of the title matched by the search text.
    ///
    /// Each tuple is `(start, end)` with an exclusive end, in char indices.
    pub highlight_ranges: Vec<(usize, usize)>,
}

impl ViewListing {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.listing.id
    }
}

/// Joins `results` with `bookmarks`. Not memoized; see [`Presenter`].
#[must_use]
pub fn present(results: &SearchResults, bookmarks: &BookmarkSet) -> Vec<ViewListing> {
    let query = results.filter.query.as_deref().unwrap_or_default();
    let matcher = (!query.is_empty()).then(SkimMatcherV2::default);

    results
        .listings
        .iter()
        .map(|listing| ViewListing {
            is_favorite: bookmarks.contains(&listing.id),
            highlight_ranges: matcher
                .as_ref()
                .map_or_else(Vec::new, |m| compute_highlight_ranges(m, &listing.title, query)),
            listing: Arc::new(listing.clone()),
        })
        .collect()
}

/// Coalesces the matcher's char indices into contiguous `(start, end)` runs.
fn compute_highlight_ranges(matcher: &SkimMatcherV2, text: &str, query: &str) -> Vec<(usize, usize)> {
    let Some((_score, indices)) = matcher.fuzzy_indices(text, query) else {
        return Vec::new();
    };

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}

/// Memoizing wrapper around [`present`].
///
/// Listings of an unchanged result set keep their `Arc<JobListing>` across
/// bookmark changes, so only the favorite flags differ between two views.
#[derive(Debug, Default)]
pub struct Presenter {
    last: Option<Memo>,
}

#[derive(Debug)]
struct Memo {
    results: Arc<SearchResults>,
    bookmark_version: u64,
    view: Arc<[ViewListing]>,
}

impl Presenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(&mut self, results: &Arc<SearchResults>, bookmarks: &BookmarkSet) -> Arc<[ViewListing]> {
        let view: Arc<[ViewListing]> = match self.last.as_ref() {
            Some(memo) if Arc::ptr_eq(&memo.results, results) => {
                if memo.bookmark_version == bookmarks.version {
                    return Arc::clone(&memo.view);
                }
                tracing::trace!(bookmark_version = bookmarks.version, "re-joining bookmark flags");
                memo.view
                    .iter()
                    .map(|item| ViewListing {
                        is_favorite: bookmarks.contains(item.id()),
                        ..item.clone()
                    })
                    .collect()
            }
            _ => {
                tracing::trace!(listings = results.listings.len(), "presenting new results");
                present(results, bookmarks).into()
            }
        };

        self.last = Some(Memo {
            results: Arc::clone(results),
            bookmark_version: bookmarks.version,
            view: Arc::clone(&view),
        });
        view
    }
}
