//! Derived views over the loaded cases: search/filter and statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::state::ALL_JURISDICTIONS;
use crate::record::CaseRecord;

/// Case-insensitive substring match of `search` against crime type or
/// jurisdiction, combined with an exact jurisdiction filter.
pub fn matches_filter(case: &CaseRecord, search: &str, jurisdiction: &str) -> bool {
    let needle = search.to_lowercase();
    let matches_search = case.crime_type.to_lowercase().contains(&needle)
        || case.jurisdiction.to_lowercase().contains(&needle);
    let matches_jurisdiction = jurisdiction == ALL_JURISDICTIONS || case.jurisdiction == jurisdiction;
    matches_search && matches_jurisdiction
}

pub fn filter_cases<'a>(
    cases: &'a [CaseRecord],
    search: &str,
    jurisdiction: &str,
) -> Vec<&'a CaseRecord> {
    cases
        .iter()
        .filter(|case| matches_filter(case, search, jurisdiction))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStats {
    pub total: usize,
    pub by_jurisdiction: BTreeMap<String, usize>,
    pub by_crime_type: BTreeMap<String, usize>,
    pub analyzed: usize,
}

impl CaseStats {
    pub fn from_cases(cases: &[CaseRecord]) -> Self {
        let mut stats = Self {
            total: cases.len(),
            ..Self::default()
        };
        for case in cases {
            *stats
                .by_jurisdiction
                .entry(case.jurisdiction.clone())
                .or_insert(0) += 1;
            *stats.by_crime_type.entry(case.crime_type.clone()).or_insert(0) += 1;
            if case.is_analyzed() {
                stats.analyzed += 1;
            }
        }
        stats
    }

    pub fn jurisdiction_count(&self) -> usize {
        self.by_jurisdiction.len()
    }

    pub fn crime_type_count(&self) -> usize {
        self.by_crime_type.len()
    }
}
