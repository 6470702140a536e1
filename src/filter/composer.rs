//! Pure composition of free text and facets into one effective filter.
//!
//! Everything here is synchronous and side-effect free. The search session
//! recomposes on every change and compares the result by value to decide
//! whether a new request is warranted.

use crate::domain::{FacetName, FacetSelection, FacetValue, Result};
use serde::{Deserialize, Serialize};

/// The canonical filter object handed to the search collaborator.
///
/// `query` is the trimmed free text, absent when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(flatten)]
    pub facets: FacetSelection,
}

/// What a filter chip stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChipKind {
    Query,
    Facet(FacetValue),
    SalaryRange,
    PublishedWithin,
}

/// One user-visible filter chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub kind: ChipKind,
    pub label: String,
}

/// Merges free text and facet selections into an [`EffectiveFilter`].
#[must_use]
pub fn compose(free_text: &str, facets: &FacetSelection) -> EffectiveFilter {
    let trimmed = free_text.trim();
    EffectiveFilter {
        query: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        facets: facets.clone(),
    }
}

/// Number of active filter chips, free text included.
#[must_use]
pub fn active_count(filter: &EffectiveFilter) -> usize {
    filter.active_count()
}

/// Returns `facets` with `value` toggled on the facet called `facet_name`.
///
/// # Errors
///
/// Fails fast with [`crate::JobsiftError::UnknownFacet`] for a facet name that
/// does not exist and [`crate::JobsiftError::InvalidFacetValue`] for a value
/// the facet cannot hold.
pub fn toggle_facet_value(facets: &FacetSelection, facet_name: &str, value: &str) -> Result<FacetSelection> {
    let facet: FacetName = facet_name.parse()?;
    let value = FacetValue::parse(facet, value)?;
    let mut next = facets.clone();
    next.toggle(value);
    Ok(next)
}

/// Clears every facet of `filter` but keeps its free text.
#[must_use]
pub fn clear(filter: &EffectiveFilter) -> EffectiveFilter {
    EffectiveFilter {
        query: filter.query.clone(),
        facets: FacetSelection::default(),
    }
}

impl EffectiveFilter {
    /// Sum of all set cardinalities, plus one each for a salary range, a
    /// publication window and free text when present.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.facet_count() + usize::from(self.query.is_some())
    }

    /// Like [`active_count`](Self::active_count) but without the free-text chip.
    #[must_use]
    pub fn facet_count(&self) -> usize {
        let f = &self.facets;
        f.contract_type.len()
            + f.work_modality.len()
            + f.experience_level.len()
            + f.location.len()
            + f.sector.len()
            + usize::from(f.has_salary_range())
            + usize::from(f.published_in_days.is_some())
    }

    /// Whether the filter constrains nothing (the unfiltered listing set).
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_none() && self.facets.is_empty()
    }

    /// The chips a user sees for this filter, in display order.
    ///
    /// `chips().len()` always equals [`active_count`](Self::active_count).
    #[must_use]
    pub fn chips(&self) -> Vec<FilterChip> {
        let f = &self.facets;
        let mut chips = Vec::with_capacity(self.active_count());

        if let Some(query) = &self.query {
            chips.push(FilterChip {
                kind: ChipKind::Query,
                label: format!("\"{query}\""),
            });
        }

        chips.extend(f.contract_type.iter().map(|v| FilterChip {
            kind: ChipKind::Facet(FacetValue::ContractType(*v)),
            label: v.label().to_string(),
        }));
        chips.extend(f.work_modality.iter().map(|v| FilterChip {
            kind: ChipKind::Facet(FacetValue::WorkModality(*v)),
            label: v.label().to_string(),
        }));
        chips.extend(f.experience_level.iter().map(|v| FilterChip {
            kind: ChipKind::Facet(FacetValue::ExperienceLevel(*v)),
            label: v.label().to_string(),
        }));
        chips.extend(f.location.iter().map(|v| FilterChip {
            kind: ChipKind::Facet(FacetValue::Location(v.clone())),
            label: v.clone(),
        }));
        chips.extend(f.sector.iter().map(|v| FilterChip {
            kind: ChipKind::Facet(FacetValue::Sector(v.clone())),
            label: v.clone(),
        }));

        let salary_label = match (f.salary_min, f.salary_max) {
            (Some(min), Some(max)) => Some(format!("Salary {min}-{max}")),
            (Some(min), None) => Some(format!("Salary from {min}")),
            (None, Some(max)) => Some(format!("Salary up to {max}")),
            (None, None) => None,
        };
        if let Some(label) = salary_label {
            chips.push(FilterChip {
                kind: ChipKind::SalaryRange,
                label,
            });
        }

        if let Some(days) = f.published_in_days {
            chips.push(FilterChip {
                kind: ChipKind::PublishedWithin,
                label: if days == 1 {
                    "Last 24 hours".to_string()
                } else {
                    format!("Last {days} days")
                },
            });
        }

        chips
    }
}
