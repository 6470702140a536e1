//! Outbound query-parameter encoding for the search endpoint.
//!
//! Array facets become repeated parameters. Absent fields are omitted
//! entirely: the API never sees an empty string or an empty list.

use super::composer::EffectiveFilter;

impl EffectiveFilter {
    /// Encodes the filter as ordered `(name, value)` query pairs.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let f = &self.facets;
        let mut pairs = Vec::new();

        if let Some(query) = &self.query {
            pairs.push(("search", query.clone()));
        }

        pairs.extend(f.contract_type.iter().map(|v| ("contractType", v.as_str().to_string())));
        pairs.extend(f.work_modality.iter().map(|v| ("workModality", v.as_str().to_string())));
        pairs.extend(f.experience_level.iter().map(|v| ("experienceLevel", v.as_str().to_string())));
        pairs.extend(f.location.iter().map(|v| ("location", v.clone())));
        pairs.extend(f.sector.iter().map(|v| ("sector", v.clone())));

        if let Some(min) = f.salary_min {
            pairs.push(("salaryMin", min.to_string()));
        }
        if let Some(max) = f.salary_max {
            pairs.push(("salaryMax", max.to_string()));
        }
        if let Some(days) = f.published_in_days {
            pairs.push(("publishedInDays", days.to_string()));
        }

        pairs
    }
}
