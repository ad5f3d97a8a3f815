use crate::contract::ContractError;

/// Errors surfaced by the case ledger client.
///
/// Read-path decode failures are normally recovered inside the store and only
/// logged; they reach callers solely from write paths that must parse a record
/// before rewriting it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseStoreError {
    #[error("Malformed data at {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("Failed to get contract with signer")]
    SigningUnavailable,

    #[error("Please connect wallet first")]
    WalletNotConnected,

    #[error("Failed to connect wallet: {0}")]
    WalletConnection(String),

    #[error("Transaction rejected by user")]
    UserRejected,

    #[error("{0}")]
    RemoteFailure(String),

    #[error("Case not found: {0}")]
    RecordNotFound(String),

    #[error("Missing required case fields: {}", .0.join(", "))]
    IncompleteDraft(Vec<&'static str>),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CaseStoreError>;

impl CaseStoreError {
    pub fn decode(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the signer declined the transaction.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected)
    }

    /// Status line shown after a failed case submission.
    pub fn submission_message(&self) -> String {
        match self {
            Self::UserRejected => self.to_string(),
            other => format!("Submission failed: {}", other),
        }
    }

    /// Status line shown after a failed analysis run.
    pub fn analysis_message(&self) -> String {
        match self {
            Self::UserRejected => self.to_string(),
            other => format!("Analysis failed: {}", other),
        }
    }
}

impl From<ContractError> for CaseStoreError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::UserRejected => Self::UserRejected,
            other => Self::RemoteFailure(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for CaseStoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
