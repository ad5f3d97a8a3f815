//! Payload encoding
//!
//! Case details are stored behind a [`PayloadCodec`]. The shipped codec only
//! emulates encryption: `FHE-` followed by base64 of the draft as JSON. It is
//! reversible by anyone and gives no confidentiality. A real scheme can be
//! dropped in behind the same trait without touching [`crate::store`].

use base64::Engine;

use crate::common::{CaseStoreError, Result};
use crate::record::CaseDraft;

pub trait PayloadCodec: Send + Sync {
    /// Turn draft contents into the opaque `data` string stored on-chain.
    fn encode(&self, draft: &CaseDraft) -> Result<String>;

    /// Recover draft contents from a stored payload.
    fn decode(&self, payload: &str) -> Result<CaseDraft>;
}

/// Base64 stand-in for FHE encryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedFheCodec;

impl SimulatedFheCodec {
    pub const PREFIX: &'static str = "FHE-";
}

impl PayloadCodec for SimulatedFheCodec {
    fn encode(&self, draft: &CaseDraft) -> Result<String> {
        let json =
            serde_json::to_vec(draft).map_err(|e| CaseStoreError::decode("payload", e))?;
        Ok(format!(
            "{}{}",
            Self::PREFIX,
            base64::engine::general_purpose::STANDARD.encode(json)
        ))
    }

    fn decode(&self, payload: &str) -> Result<CaseDraft> {
        let body = payload
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| CaseStoreError::decode("payload", "missing FHE- prefix"))?;
        let json = base64::engine::general_purpose::STANDARD
            .decode(body)
            .map_err(|e| CaseStoreError::decode("payload", e))?;
        serde_json::from_slice(&json).map_err(|e| CaseStoreError::decode("payload", e))
    }
}
