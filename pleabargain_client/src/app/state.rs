use serde::{Deserialize, Serialize};

use super::view::{self, CaseStats};
use crate::record::{CaseDraft, CaseRecord};

/// Jurisdiction filter value that matches every case.
pub const ALL_JURISDICTIONS: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    Pending,
    Success,
    Error,
}

/// Transient transaction status line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub visible: bool,
    pub kind: StatusKind,
    pub message: String,
    /// Bumped on every shown status so stale dismiss timers are ignored
    pub seq: u64,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        Self {
            visible: false,
            kind: StatusKind::Pending,
            message: String::new(),
            seq: 0,
        }
    }
}

/// Everything the presentation layer renders, in one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub account: String,
    pub wallet_connected: bool,
    pub loading: bool,
    pub refreshing: bool,
    pub creating: bool,
    pub cases: Vec<CaseRecord>,
    pub status: TransactionStatus,
    pub show_create_form: bool,
    pub draft: CaseDraft,
    pub search_term: String,
    pub selected_jurisdiction: String,
    /// Case whose analysis panel is expanded
    pub expanded_analysis: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            account: String::new(),
            wallet_connected: false,
            loading: true,
            refreshing: false,
            creating: false,
            cases: Vec::new(),
            status: TransactionStatus::default(),
            show_create_form: false,
            draft: CaseDraft::default(),
            search_term: String::new(),
            selected_jurisdiction: ALL_JURISDICTIONS.to_string(),
            expanded_analysis: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    WalletConnected(String),
    AccountChanged(String),
    WalletDisconnected,
    RefreshStarted,
    CasesLoaded(Vec<CaseRecord>),
    RefreshFinished,
    OpenCreateForm,
    CloseCreateForm,
    UpdateDraft(CaseDraft),
    ResetDraft,
    SubmitStarted,
    SubmitFinished,
    ShowStatus { kind: StatusKind, message: String },
    DismissStatus { seq: u64 },
    SetSearchTerm(String),
    SelectJurisdiction(String),
    ToggleAnalysis(String),
}

impl AppState {
    /// Apply one action, producing the next state.
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::WalletConnected(account) => {
                self.account = account;
                self.wallet_connected = true;
            }
            Action::AccountChanged(account) => self.account = account,
            Action::WalletDisconnected => {
                self.account.clear();
                self.wallet_connected = false;
            }
            Action::RefreshStarted => self.refreshing = true,
            Action::CasesLoaded(cases) => self.cases = cases,
            Action::RefreshFinished => {
                self.refreshing = false;
                self.loading = false;
            }
            Action::OpenCreateForm => self.show_create_form = true,
            Action::CloseCreateForm => self.show_create_form = false,
            Action::UpdateDraft(draft) => self.draft = draft,
            Action::ResetDraft => self.draft = CaseDraft::default(),
            Action::SubmitStarted => self.creating = true,
            Action::SubmitFinished => self.creating = false,
            Action::ShowStatus { kind, message } => {
                self.status = TransactionStatus {
                    visible: true,
                    kind,
                    message,
                    seq: self.status.seq + 1,
                };
            }
            Action::DismissStatus { seq } => {
                if self.status.seq == seq {
                    self.status.visible = false;
                    self.status.kind = StatusKind::Pending;
                    self.status.message.clear();
                }
            }
            Action::SetSearchTerm(term) => self.search_term = term,
            Action::SelectJurisdiction(jurisdiction) => {
                self.selected_jurisdiction = jurisdiction
            }
            Action::ToggleAnalysis(id) => {
                self.expanded_analysis = match self.expanded_analysis.take() {
                    Some(current) if current == id => None,
                    _ => Some(id),
                };
            }
        }
        self
    }

    /// Cases passing the current search term and jurisdiction filter.
    pub fn filtered_cases(&self) -> Vec<&CaseRecord> {
        view::filter_cases(&self.cases, &self.search_term, &self.selected_jurisdiction)
    }

    pub fn stats(&self) -> CaseStats {
        CaseStats::from_cases(&self.cases)
    }

    /// Whether the submit button would be enabled.
    pub fn can_submit(&self) -> bool {
        !self.creating && self.draft.is_complete()
    }
}
