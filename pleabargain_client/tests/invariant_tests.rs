//! Property-based tests for ordering, filtering and statistics invariants

use proptest::prelude::*;
use std::sync::Arc;

use pleabargain_client::app::{filter_cases, matches_filter, CaseStats, ALL_JURISDICTIONS};
use pleabargain_client::config::StoreConfig;
use pleabargain_client::contract::{MemoryContract, StaticProvider};
use pleabargain_client::record::StoredCase;
use pleabargain_client::store::sort_newest_first;
use pleabargain_client::{CaseRecord, CaseStore, PENDING_ANALYSIS};

const JURISDICTIONS: [&str; 4] = ["Federal", "State", "County", "Municipal"];
const CRIME_TYPES: [&str; 5] = ["Drug", "Property", "Violent", "White Collar", "Other"];

fn arb_case() -> impl Strategy<Value = CaseRecord> {
    (
        "[0-9]{13}-[a-z0-9]{7}",
        0i64..2_000_000_000,
        prop::sample::select(JURISDICTIONS.to_vec()),
        prop::sample::select(CRIME_TYPES.to_vec()),
        any::<bool>(),
    )
        .prop_map(|(id, created_at, jurisdiction, crime_type, analyzed)| CaseRecord {
            id,
            payload: "FHE-e30=".to_string(),
            created_at,
            jurisdiction: jurisdiction.to_string(),
            crime_type: crime_type.to_string(),
            outcome: "Plea".to_string(),
            analysis: if analyzed {
                "Fairness Score: 82%".to_string()
            } else {
                PENDING_ANALYSIS.to_string()
            },
        })
}

proptest! {
    #[test]
    fn prop_sort_is_descending_permutation(mut cases in prop::collection::vec(arb_case(), 0..40)) {
        let mut expected_ids: Vec<String> = cases.iter().map(|c| c.id.clone()).collect();
        sort_newest_first(&mut cases);

        for pair in cases.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
        let mut ids: Vec<String> = cases.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        expected_ids.sort();
        prop_assert_eq!(ids, expected_ids);
    }

    #[test]
    fn prop_empty_search_all_jurisdictions_keeps_everything(cases in prop::collection::vec(arb_case(), 0..40)) {
        prop_assert_eq!(filter_cases(&cases, "", ALL_JURISDICTIONS).len(), cases.len());
    }

    #[test]
    fn prop_jurisdiction_filter_is_exact(
        cases in prop::collection::vec(arb_case(), 0..40),
        jurisdiction in prop::sample::select(JURISDICTIONS.to_vec()),
    ) {
        let found = filter_cases(&cases, "", jurisdiction);
        prop_assert!(found.iter().all(|c| c.jurisdiction == jurisdiction));
        let expected = cases.iter().filter(|c| c.jurisdiction == jurisdiction).count();
        prop_assert_eq!(found.len(), expected);
    }

    #[test]
    fn prop_search_ignores_case(case in arb_case(), upper in any::<bool>()) {
        let term = if upper { case.crime_type.to_uppercase() } else { case.crime_type.to_lowercase() };
        prop_assert!(matches_filter(&case, &term, ALL_JURISDICTIONS));
    }

    #[test]
    fn prop_stats_partition_total(cases in prop::collection::vec(arb_case(), 0..40)) {
        let stats = CaseStats::from_cases(&cases);
        prop_assert_eq!(stats.total, cases.len());
        prop_assert_eq!(stats.by_jurisdiction.values().sum::<usize>(), cases.len());
        prop_assert_eq!(stats.by_crime_type.values().sum::<usize>(), cases.len());
        prop_assert!(stats.analyzed <= stats.total);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_load_all_returns_indexed_records_newest_first(
        timestamps in prop::collection::vec(0i64..1_000_000, 0..12),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let contract = Arc::new(MemoryContract::new());
        let mut ids = Vec::new();
        for (i, timestamp) in timestamps.iter().enumerate() {
            let id = format!("case{}", i);
            let stored = StoredCase {
                data: "FHE-e30=".to_string(),
                timestamp: *timestamp,
                jurisdiction: "Federal".to_string(),
                crime_type: "Drug".to_string(),
                outcome: "Plea".to_string(),
                fhe_analysis: None,
            };
            contract.insert_raw(&format!("case_{}", id), serde_json::to_vec(&stored).unwrap());
            ids.push(id);
        }
        contract.insert_raw("case_keys", serde_json::to_vec(&ids).unwrap());

        let store = CaseStore::new(Arc::new(StaticProvider::new(contract)), StoreConfig::default());
        let cases = runtime.block_on(store.load_all());

        prop_assert_eq!(cases.len(), timestamps.len());
        let mut expected = timestamps.clone();
        expected.sort_by(|a, b| b.cmp(a));
        let loaded: Vec<i64> = cases.iter().map(|c| c.created_at).collect();
        prop_assert_eq!(loaded, expected);
    }
}
