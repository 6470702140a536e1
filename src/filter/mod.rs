//! Filter composition: free text plus facets into one canonical filter.
//!
//! - [`composer`]: `compose`, counting, chips, toggling and clearing
//! - `query`: encoding of an [`EffectiveFilter`] into query parameters

pub mod composer;
mod query;

pub use composer::{active_count, clear, compose, toggle_facet_value, ChipKind, EffectiveFilter, FilterChip};
