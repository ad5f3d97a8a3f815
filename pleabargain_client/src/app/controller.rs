use log::{error, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use super::state::{Action, AppState, StatusKind};
use crate::analysis::{self, Analyzer};
use crate::common::{CaseStoreError, Result};
use crate::config::StatusConfig;
use crate::record::CaseDraft;
use crate::store::CaseStore;
use crate::wallet::{WalletProvider, WalletSession};

const MSG_SUBMIT_PENDING: &str = "Encrypting plea bargaining data with FHE...";
const MSG_SUBMIT_OK: &str = "Encrypted plea data submitted securely!";
const MSG_ANALYSIS_PENDING: &str = "Running FHE fairness analysis...";
const MSG_ANALYSIS_OK: &str = "FHE analysis completed successfully!";

/// Orchestrates wallet, store and analyzer calls and folds their results into
/// a single [`AppState`] through [`AppState::reduce`].
///
/// Operations are not serialised against each other: while one awaits the
/// contract, others may run and interleave their writes.
pub struct CaseApp {
    store: CaseStore,
    analyzer: Arc<dyn Analyzer>,
    status_config: StatusConfig,
    state: Arc<watch::Sender<AppState>>,
    wallet: Mutex<WalletSession>,
}

impl CaseApp {
    pub fn new(store: CaseStore, analyzer: Arc<dyn Analyzer>, status_config: StatusConfig) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            store,
            analyzer,
            status_config,
            state: Arc::new(state),
            wallet: Mutex::new(WalletSession::new()),
        }
    }

    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn dispatch(&self, action: Action) {
        apply(&self.state, action);
    }

    /// Initial load.
    pub async fn init(&self) {
        self.refresh().await;
    }

    /// Connect a wallet and follow its account changes until disconnect.
    pub async fn connect_wallet(&self, provider: Arc<dyn WalletProvider>) -> Result<String> {
        let mut session = self.wallet.lock().await;
        let account = session.connect(provider).await.map_err(|e| {
            warn!("Failed to connect wallet: {}", e);
            CaseStoreError::WalletConnection(e.to_string())
        })?;
        // Changes queued since the subscription apply on top of this account.
        self.dispatch(Action::WalletConnected(account.clone()));
        let state = self.state.clone();
        session.listen(move |account| apply(&state, Action::AccountChanged(account)));
        Ok(account)
    }

    pub async fn disconnect_wallet(&self) {
        self.wallet.lock().await.disconnect();
        self.dispatch(Action::WalletDisconnected);
    }

    /// Reload every case. An unavailable contract leaves the list untouched.
    pub async fn refresh(&self) {
        self.dispatch(Action::RefreshStarted);
        if self.store.is_available().await {
            let cases = self.store.load_all().await;
            self.dispatch(Action::CasesLoaded(cases));
        } else {
            error!("Contract is not available");
        }
        self.dispatch(Action::RefreshFinished);
    }

    pub fn open_create_form(&self) {
        self.dispatch(Action::OpenCreateForm);
    }

    pub fn close_create_form(&self) {
        self.dispatch(Action::CloseCreateForm);
    }

    pub fn update_draft(&self, draft: CaseDraft) {
        self.dispatch(Action::UpdateDraft(draft));
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        self.dispatch(Action::SetSearchTerm(term.into()));
    }

    pub fn select_jurisdiction(&self, jurisdiction: impl Into<String>) {
        self.dispatch(Action::SelectJurisdiction(jurisdiction.into()));
    }

    pub fn toggle_analysis(&self, case_id: impl Into<String>) {
        self.dispatch(Action::ToggleAnalysis(case_id.into()));
    }

    /// Submit the current draft. Returns the new case id.
    ///
    /// On success the form closes and the draft resets once the success
    /// status is dismissed.
    pub async fn submit_case(&self) -> Result<String> {
        let snapshot = self.snapshot();
        if !snapshot.wallet_connected {
            return Err(CaseStoreError::WalletNotConnected);
        }
        let missing = snapshot.draft.missing_fields();
        if !missing.is_empty() {
            return Err(CaseStoreError::IncompleteDraft(missing));
        }

        self.dispatch(Action::SubmitStarted);
        self.show_status(StatusKind::Pending, MSG_SUBMIT_PENDING);

        let result = self.store.save(&snapshot.draft).await;
        match &result {
            Ok(_) => {
                let seq = self.show_status(StatusKind::Success, MSG_SUBMIT_OK);
                self.refresh().await;
                self.schedule_dismiss(
                    seq,
                    self.status_config.success_delay(),
                    vec![Action::CloseCreateForm, Action::ResetDraft],
                );
            }
            Err(e) => {
                error!("Case submission failed: {}", e);
                let seq = self.show_status(StatusKind::Error, e.submission_message());
                self.schedule_dismiss(seq, self.status_config.error_delay(), Vec::new());
            }
        }
        self.dispatch(Action::SubmitFinished);
        result
    }

    /// Run the simulated analysis on one case and attach the report.
    pub async fn run_analysis(&self, case_id: &str) -> Result<()> {
        if !self.snapshot().wallet_connected {
            return Err(CaseStoreError::WalletNotConnected);
        }

        self.show_status(StatusKind::Pending, MSG_ANALYSIS_PENDING);
        match analysis::run_analysis(&self.store, self.analyzer.as_ref(), case_id).await {
            Ok(_) => {
                let seq = self.show_status(StatusKind::Success, MSG_ANALYSIS_OK);
                self.refresh().await;
                self.schedule_dismiss(seq, self.status_config.success_delay(), Vec::new());
                Ok(())
            }
            Err(e) => {
                error!("Analysis of case {} failed: {}", case_id, e);
                let seq = self.show_status(StatusKind::Error, e.analysis_message());
                self.schedule_dismiss(seq, self.status_config.error_delay(), Vec::new());
                Err(e)
            }
        }
    }

    fn show_status(&self, kind: StatusKind, message: impl Into<String>) -> u64 {
        self.dispatch(Action::ShowStatus {
            kind,
            message: message.into(),
        });
        self.state.borrow().status.seq
    }

    fn schedule_dismiss(&self, seq: u64, delay: Duration, follow_up: Vec<Action>) {
        let state = self.state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut dismissed = false;
            state.send_modify(|current| {
                dismissed = current.status.visible && current.status.seq == seq;
                let previous = std::mem::take(current);
                *current = previous.reduce(Action::DismissStatus { seq });
            });
            // Superseded by a newer status.
            if !dismissed {
                return;
            }
            for action in follow_up {
                apply(&state, action);
            }
        });
    }
}

fn apply(state: &watch::Sender<AppState>, action: Action) {
    state.send_modify(|current| {
        let previous = std::mem::take(current);
        *current = previous.reduce(action);
    });
}
