//! Contract Interface
//!
//! Raw key/value access to the PleaBargainFHE ledger contract. The contract
//! only knows "get bytes for key" and "set bytes for key"; everything about
//! case records and the id index lives in [`crate::store`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod file;
pub mod memory;

pub use file::FileContract;
pub use memory::{MemoryContract, WriteGate};

/// Marker wallets put in the error message when the user declines to sign.
const REJECTION_MARKER: &str = "user rejected transaction";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("user rejected transaction")]
    UserRejected,

    #[error("Contract is not available")]
    Unavailable,

    #[error("{0}")]
    Remote(String),
}

impl ContractError {
    /// Classify a raw provider error message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains(REJECTION_MARKER) {
            Self::UserRejected
        } else {
            Self::Remote(message)
        }
    }
}

pub type Result<T> = std::result::Result<T, ContractError>;

/// Outcome of a confirmed `set_data` transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub key: String,
    pub bytes_written: usize,
    /// Monotonic write counter of the backing contract
    pub sequence: u64,
}

#[async_trait]
pub trait ContractInterface: Send + Sync {
    /// Liveness check; callers skip every other operation when this is false.
    async fn is_available(&self) -> bool;

    /// Bytes stored at `key`. An absent key yields an empty vector, not an error.
    async fn get_data(&self, key: &str) -> Result<Vec<u8>>;

    /// Store `value` at `key`, overwriting whatever was there.
    async fn set_data(&self, key: &str, value: &[u8]) -> Result<TxReceipt>;
}

/// Hands out contract handles per operation; nothing is pooled.
#[async_trait]
pub trait ContractProvider: Send + Sync {
    /// Handle for reads. `None` when no connection can be made.
    async fn read_only(&self) -> Option<Arc<dyn ContractInterface>>;

    /// Handle able to sign writes. `None` when no signer is present.
    async fn with_signer(&self) -> Option<Arc<dyn ContractInterface>>;
}

/// Provider over fixed handles, used by the CLI and tests.
#[derive(Clone)]
pub struct StaticProvider {
    reader: Arc<dyn ContractInterface>,
    signer: Option<Arc<dyn ContractInterface>>,
}

impl StaticProvider {
    /// Reads and signed writes go through the same contract handle.
    pub fn new(contract: Arc<dyn ContractInterface>) -> Self {
        Self {
            reader: contract.clone(),
            signer: Some(contract),
        }
    }

    /// No signer: every write fails before touching the contract.
    pub fn reader_only(contract: Arc<dyn ContractInterface>) -> Self {
        Self {
            reader: contract,
            signer: None,
        }
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }
}

#[async_trait]
impl ContractProvider for StaticProvider {
    async fn read_only(&self) -> Option<Arc<dyn ContractInterface>> {
        Some(self.reader.clone())
    }

    async fn with_signer(&self) -> Option<Arc<dyn ContractInterface>> {
        self.signer.clone()
    }
}
