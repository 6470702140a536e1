//! Facet types: the independent filter dimensions of a job search.
//!
//! A facet selection is a fixed-shape record of named sets and optional
//! bounds. Values inside one set are ORed by the server, facets are ANDed.
//! Sets are `BTreeSet`s so they stay deduplicated and encode in a stable
//! order.

use super::error::{JobsiftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Generates a closed facet enum with its wire name and chip label.
///
/// The wire name doubles as the serde representation and the `FromStr` input.
macro_rules! facet_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($wire:literal, $label:literal)),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )*
        }

        impl $name {
            /// Every value of this facet, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Value as sent to the API.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)*
                }
            }

            /// Human-readable chip label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)*
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

facet_enum! {
    /// Contractual form of the position.
    ContractType {
        FullTime => ("FULL_TIME", "Full time"),
        PartTime => ("PART_TIME", "Part time"),
        Contract => ("CONTRACT", "Contract"),
        Internship => ("INTERNSHIP", "Internship"),
        Freelance => ("FREELANCE", "Freelance"),
        Temporary => ("TEMPORARY", "Temporary"),
    }
}

facet_enum! {
    /// Where the work happens.
    WorkModality {
        OnSite => ("ON_SITE", "On site"),
        Remote => ("REMOTE", "Remote"),
        Hybrid => ("HYBRID", "Hybrid"),
    }
}

facet_enum! {
    /// Seniority asked for by the listing.
    ExperienceLevel {
        Entry => ("ENTRY", "Entry level"),
        Junior => ("JUNIOR", "Junior"),
        Mid => ("MID", "Mid level"),
        Senior => ("SENIOR", "Senior"),
        Lead => ("LEAD", "Lead"),
    }
}

/// Names of the set-valued facets.
///
/// Salary and publication date are bounds rather than sets and are edited
/// through dedicated setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetName {
    ContractType,
    WorkModality,
    ExperienceLevel,
    Location,
    Sector,
}

impl FacetName {
    /// Name used in query parameters and string-based toggles.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContractType => "contractType",
            Self::WorkModality => "workModality",
            Self::ExperienceLevel => "experienceLevel",
            Self::Location => "location",
            Self::Sector => "sector",
        }
    }
}

impl FromStr for FacetName {
    type Err = JobsiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contractType" => Ok(Self::ContractType),
            "workModality" => Ok(Self::WorkModality),
            "experienceLevel" => Ok(Self::ExperienceLevel),
            "location" => Ok(Self::Location),
            "sector" => Ok(Self::Sector),
            other => Err(JobsiftError::UnknownFacet(other.to_string())),
        }
    }
}

impl fmt::Display for FacetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value of a set-valued facet, tagged with the facet it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FacetValue {
    ContractType(ContractType),
    WorkModality(WorkModality),
    ExperienceLevel(ExperienceLevel),
    Location(String),
    Sector(String),
}

impl FacetValue {
    /// Parses a raw value for the named facet.
    ///
    /// # Errors
    ///
    /// Returns [`JobsiftError::InvalidFacetValue`] when an enum facet receives a
    /// value outside its closed set, or when a free-form facet receives an
    /// empty value.
    pub fn parse(facet: FacetName, raw: &str) -> Result<Self> {
        let invalid = || JobsiftError::InvalidFacetValue {
            facet: facet.to_string(),
            value: raw.to_string(),
        };
        match facet {
            FacetName::ContractType => raw.parse().map(Self::ContractType).map_err(|()| invalid()),
            FacetName::WorkModality => raw.parse().map(Self::WorkModality).map_err(|()| invalid()),
            FacetName::ExperienceLevel => raw.parse().map(Self::ExperienceLevel).map_err(|()| invalid()),
            FacetName::Location | FacetName::Sector => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(invalid());
                }
                Ok(if facet == FacetName::Location {
                    Self::Location(trimmed.to_string())
                } else {
                    Self::Sector(trimmed.to_string())
                })
            }
        }
    }

    #[must_use]
    pub const fn facet(&self) -> FacetName {
        match self {
            Self::ContractType(_) => FacetName::ContractType,
            Self::WorkModality(_) => FacetName::WorkModality,
            Self::ExperienceLevel(_) => FacetName::ExperienceLevel,
            Self::Location(_) => FacetName::Location,
            Self::Sector(_) => FacetName::Sector,
        }
    }
}

/// The user's facet choices.
///
/// Every set is deduplicated and unordered from the user's perspective;
/// toggling a value twice restores the original set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSelection {
    #[serde(default)]
    pub contract_type: BTreeSet<ContractType>,
    #[serde(default)]
    pub work_modality: BTreeSet<WorkModality>,
    #[serde(default)]
    pub experience_level: BTreeSet<ExperienceLevel>,
    #[serde(default)]
    pub location: BTreeSet<String>,
    #[serde(default)]
    pub sector: BTreeSet<String>,
    #[serde(default)]
    pub salary_min: Option<u32>,
    #[serde(default)]
    pub salary_max: Option<u32>,
    #[serde(default)]
    pub published_in_days: Option<u32>,
}

fn toggle_in<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if set.contains(&value) {
        set.remove(&value);
    } else {
        set.insert(value);
    }
}

impl FacetSelection {
    /// Flips membership of `value` in its facet set (symmetric difference).
    pub fn toggle(&mut self, value: FacetValue) {
        match value {
            FacetValue::ContractType(v) => toggle_in(&mut self.contract_type, v),
            FacetValue::WorkModality(v) => toggle_in(&mut self.work_modality, v),
            FacetValue::ExperienceLevel(v) => toggle_in(&mut self.experience_level, v),
            FacetValue::Location(v) => toggle_in(&mut self.location, v),
            FacetValue::Sector(v) => toggle_in(&mut self.sector, v),
        }
    }

    /// Returns whether `value` is currently selected.
    #[must_use]
    pub fn contains(&self, value: &FacetValue) -> bool {
        match value {
            FacetValue::ContractType(v) => self.contract_type.contains(v),
            FacetValue::WorkModality(v) => self.work_modality.contains(v),
            FacetValue::ExperienceLevel(v) => self.experience_level.contains(v),
            FacetValue::Location(v) => self.location.contains(v),
            FacetValue::Sector(v) => self.sector.contains(v),
        }
    }

    /// Sets both salary bounds at once; `None` removes a bound.
    pub fn set_salary_range(&mut self, min: Option<u32>, max: Option<u32>) {
        self.salary_min = min;
        self.salary_max = max;
    }

    /// Restricts results to listings published within the last `days` days.
    pub fn set_published_within(&mut self, days: Option<u32>) {
        self.published_in_days = days;
    }

    /// Whether a salary bound is present (counted as a single chip).
    #[must_use]
    pub const fn has_salary_range(&self) -> bool {
        self.salary_min.is_some() || self.salary_max.is_some()
    }

    /// Whether no facet constrains the search.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contract_type.is_empty()
            && self.work_modality.is_empty()
            && self.experience_level.is_empty()
            && self.location.is_empty()
            && self.sector.is_empty()
            && !self.has_salary_range()
            && self.published_in_days.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_the_set() {
        let original = FacetSelection::default();
        let mut facets = original.clone();
        facets.toggle(FacetValue::WorkModality(WorkModality::Remote));
        assert!(facets.contains(&FacetValue::WorkModality(WorkModality::Remote)));
        facets.toggle(FacetValue::WorkModality(WorkModality::Remote));
        assert_eq!(facets, original);
    }

    #[test]
    fn enum_wire_names_round_trip_through_from_str() {
        for value in ContractType::ALL {
            assert_eq!(value.as_str().parse::<ContractType>(), Ok(*value));
        }
        assert_eq!(
            serde_json::to_string(&ExperienceLevel::Senior).unwrap(),
            "\"SENIOR\""
        );
    }

    #[test]
    fn parse_rejects_values_outside_the_enum() {
        let err = FacetValue::parse(FacetName::ContractType, "FOREVER").unwrap_err();
        assert!(matches!(err, JobsiftError::InvalidFacetValue { .. }));
        let err = FacetValue::parse(FacetName::Location, "   ").unwrap_err();
        assert!(matches!(err, JobsiftError::InvalidFacetValue { .. }));
    }

    #[test]
    fn unknown_facet_name_fails_fast() {
        let err = "salaryBand".parse::<FacetName>().unwrap_err();
        assert!(matches!(err, JobsiftError::UnknownFacet(name) if name == "salaryBand"));
    }

    #[test]
    fn salary_range_counts_when_either_bound_is_set() {
        let mut facets = FacetSelection::default();
        assert!(facets.is_empty());
        facets.set_salary_range(None, Some(5000));
        assert!(facets.has_salary_range());
        assert!(!facets.is_empty());
    }
}
