//! End-to-end flows through the application controller

use std::sync::Arc;
use std::time::Duration;

use pleabargain_client::analysis::SimulatedAnalyzer;
use pleabargain_client::app::{CaseApp, StatusKind};
use pleabargain_client::config::{StatusConfig, StoreConfig};
use pleabargain_client::contract::{MemoryContract, StaticProvider};
use pleabargain_client::wallet::LocalWallet;
use pleabargain_client::{AnalysisState, CaseDraft, CaseStore, CaseStoreError};

fn app_over(contract: Arc<MemoryContract>, analysis_delay: Duration) -> CaseApp {
    let store = CaseStore::new(Arc::new(StaticProvider::new(contract)), StoreConfig::default());
    CaseApp::new(
        store,
        Arc::new(SimulatedAnalyzer::default().with_delay(analysis_delay)),
        StatusConfig::default(),
    )
}

async fn connected_app(contract: Arc<MemoryContract>) -> CaseApp {
    let app = app_over(contract, Duration::ZERO);
    app.init().await;
    app.connect_wallet(Arc::new(LocalWallet::new(vec![
        "0x1111111111111111111111111111111111111111".to_string(),
    ])))
    .await
    .unwrap();
    app
}

/// Let timers that are due run before inspecting state.
async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
    tokio::task::yield_now().await;
}

#[tokio::test]
async fn test_init_clears_loading() {
    let app = app_over(Arc::new(MemoryContract::new()), Duration::ZERO);
    assert!(app.snapshot().loading);
    app.init().await;
    let state = app.snapshot();
    assert!(!state.loading);
    assert!(!state.refreshing);
    assert!(state.cases.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_submit_success_flow() {
    let contract = Arc::new(MemoryContract::new());
    let app = connected_app(contract).await;
    app.open_create_form();
    app.update_draft(CaseDraft::new("Federal", "Drug", "Dismissed").with_details("no priors"));

    let id = app.submit_case().await.unwrap();

    let state = app.snapshot();
    assert!(!state.creating);
    assert_eq!(state.cases.len(), 1);
    assert_eq!(state.cases[0].id, id);
    assert!(state.status.visible);
    assert_eq!(state.status.kind, StatusKind::Success);
    assert_eq!(state.status.message, "Encrypted plea data submitted securely!");
    assert!(state.show_create_form);

    advance(Duration::from_millis(2001)).await;
    let state = app.snapshot();
    assert!(!state.status.visible);
    assert!(!state.show_create_form);
    assert_eq!(state.draft, CaseDraft::default());
}

#[tokio::test(start_paused = true)]
async fn test_submit_rejected_by_user() {
    let contract = Arc::new(MemoryContract::new());
    let app = connected_app(contract.clone()).await;
    app.open_create_form();
    app.update_draft(CaseDraft::new("State", "Violent", "Reduced sentence"));
    contract.reject_next_write();

    let result = app.submit_case().await;
    assert_eq!(result, Err(CaseStoreError::UserRejected));

    let state = app.snapshot();
    assert_eq!(state.status.kind, StatusKind::Error);
    assert_eq!(state.status.message, "Transaction rejected by user");
    assert!(!state.creating);

    // The form keeps the draft so the user can retry.
    advance(Duration::from_millis(3001)).await;
    let state = app.snapshot();
    assert!(!state.status.visible);
    assert!(state.show_create_form);
    assert_eq!(state.draft.outcome, "Reduced sentence");
}

#[tokio::test(start_paused = true)]
async fn test_stale_success_timer_keeps_next_draft() {
    let contract = Arc::new(MemoryContract::new());
    let app = connected_app(contract.clone()).await;
    app.open_create_form();
    app.update_draft(CaseDraft::new("Federal", "Drug", "Dismissed"));
    app.submit_case().await.unwrap();

    // The next submission fails before the first success status is dismissed.
    let next = CaseDraft::new("State", "Property", "Probation");
    app.update_draft(next.clone());
    contract.reject_next_write();
    assert_eq!(app.submit_case().await, Err(CaseStoreError::UserRejected));

    advance(Duration::from_millis(2001)).await;
    let state = app.snapshot();
    assert!(state.status.visible);
    assert_eq!(state.status.message, "Transaction rejected by user");
    assert!(state.show_create_form);
    assert_eq!(state.draft, next);

    advance(Duration::from_millis(1000)).await;
    let state = app.snapshot();
    assert!(!state.status.visible);
    assert!(state.show_create_form);
    assert_eq!(state.draft, next);
}

#[tokio::test]
async fn test_cancel_form_keeps_draft() {
    let app = app_over(Arc::new(MemoryContract::new()), Duration::ZERO);
    app.open_create_form();
    app.update_draft(CaseDraft::new("County", "Other", "Fine"));
    app.close_create_form();

    let state = app.snapshot();
    assert!(!state.show_create_form);
    assert_eq!(state.draft.outcome, "Fine");
}

#[tokio::test]
async fn test_submit_remote_failure_message() {
    let contract = Arc::new(MemoryContract::new());
    let app = connected_app(contract.clone()).await;
    app.update_draft(CaseDraft::new("County", "Property", "Restitution"));
    contract.fail_writes_to("case_keys");

    let result = app.submit_case().await;
    assert!(matches!(result, Err(CaseStoreError::RemoteFailure(_))));
    let status = app.snapshot().status;
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status
        .message
        .starts_with("Submission failed: transaction reverted while writing case_keys"));
}

#[tokio::test(start_paused = true)]
async fn test_analysis_flow() {
    let contract = Arc::new(MemoryContract::new());
    let store = CaseStore::new(
        Arc::new(StaticProvider::new(contract.clone())),
        StoreConfig::default(),
    );
    let id = store.save(&CaseDraft::new("Federal", "Drug", "Dismissed")).await.unwrap();

    let app = app_over(contract, Duration::from_secs(3));
    app.init().await;
    app.connect_wallet(Arc::new(LocalWallet::new(vec!["0xabc".to_string()])))
        .await
        .unwrap();
    assert_eq!(app.snapshot().stats().analyzed, 0);

    let started = tokio::time::Instant::now();
    app.run_analysis(&id).await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(3));

    let state = app.snapshot();
    assert_eq!(state.status.message, "FHE analysis completed successfully!");
    assert_eq!(state.cases[0].analysis_state(), AnalysisState::Completed);
    assert!(state.cases[0].analysis.starts_with("Fairness Score: 82%"));
    assert_eq!(state.stats().analyzed, 1);

    app.toggle_analysis(id.clone());
    assert_eq!(app.snapshot().expanded_analysis, Some(id));
}

#[tokio::test]
async fn test_analysis_of_missing_case() {
    let contract = Arc::new(MemoryContract::new());
    let app = connected_app(contract.clone()).await;

    let result = app.run_analysis("1700000000000-ghost00").await;
    assert!(matches!(result, Err(CaseStoreError::RecordNotFound(_))));
    let status = app.snapshot().status;
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.message, "Analysis failed: Case not found: 1700000000000-ghost00");
    assert_eq!(contract.write_count(), 0);
}

#[tokio::test]
async fn test_analysis_requires_wallet() {
    let app = app_over(Arc::new(MemoryContract::new()), Duration::ZERO);
    assert_eq!(
        app.run_analysis("any").await,
        Err(CaseStoreError::WalletNotConnected)
    );
}

#[tokio::test]
async fn test_search_and_filter_over_loaded_cases() {
    let contract = Arc::new(MemoryContract::new());
    let app = connected_app(contract).await;
    for (jurisdiction, crime_type) in [("Federal", "Drug"), ("State", "Drug"), ("State", "White Collar")] {
        app.update_draft(CaseDraft::new(jurisdiction, crime_type, "Plea"));
        app.submit_case().await.unwrap();
    }

    assert_eq!(app.snapshot().filtered_cases().len(), 3);
    app.set_search_term("drug");
    assert_eq!(app.snapshot().filtered_cases().len(), 2);
    app.select_jurisdiction("State");
    let state = app.snapshot();
    let found = state.filtered_cases();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].crime_type, "Drug");

    let stats = state.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.jurisdiction_count(), 2);
    assert_eq!(stats.crime_type_count(), 2);
}
