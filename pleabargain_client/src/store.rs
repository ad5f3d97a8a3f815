//! Case Record Store
//!
//! Load/save API over the raw key/value contract. Two kinds of keys are used:
//!
//! - the index key (`case_keys`) holds a JSON array of every case id;
//! - each case lives under `case_<id>` as a JSON object.
//!
//! The record write and the index write are separate transactions. A failure
//! between them leaves an orphaned record, and two concurrent saves can each
//! append to the same old index so that the later index write drops the
//! other's id. Neither is compensated here.

use log::{debug, error, info, warn};
use rand::Rng;
use std::sync::Arc;

use crate::codec::{PayloadCodec, SimulatedFheCodec};
use crate::common::{CaseStoreError, Result};
use crate::config::StoreConfig;
use crate::contract::{ContractInterface, ContractProvider};
use crate::record::{CaseDraft, CaseRecord, StoredCase, PENDING_ANALYSIS};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Record store adapter over a [`ContractProvider`]
#[derive(Clone)]
pub struct CaseStore {
    provider: Arc<dyn ContractProvider>,
    codec: Arc<dyn PayloadCodec>,
    config: StoreConfig,
}

impl CaseStore {
    pub fn new(provider: Arc<dyn ContractProvider>, config: StoreConfig) -> Self {
        Self {
            provider,
            codec: Arc::new(SimulatedFheCodec),
            config,
        }
    }

    /// Swap the payload codec, e.g. for a real encryption scheme.
    pub fn with_codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn codec(&self) -> &dyn PayloadCodec {
        self.codec.as_ref()
    }

    pub fn index_key(&self) -> &str {
        &self.config.index_key
    }

    pub fn record_key(&self, id: &str) -> String {
        format!("{}{}", self.config.record_prefix, id)
    }

    /// Whether a read handle exists and the contract reports itself live.
    pub async fn is_available(&self) -> bool {
        match self.provider.read_only().await {
            Some(contract) => contract.is_available().await,
            None => false,
        }
    }

    /// Every decodable case, newest first.
    ///
    /// Never fails: an unreadable or malformed index yields an empty list and
    /// a bad record only drops that record.
    pub async fn load_all(&self) -> Vec<CaseRecord> {
        let contract = match self.provider.read_only().await {
            Some(contract) => contract,
            None => {
                warn!("No read-only contract handle, returning no cases");
                return Vec::new();
            }
        };

        let ids = match contract.get_data(self.index_key()).await {
            Ok(bytes) => self.decode_index(&bytes),
            Err(e) => {
                error!("Error loading case keys: {}", e);
                return Vec::new();
            }
        };

        let mut cases = Vec::with_capacity(ids.len());
        for id in ids {
            let key = self.record_key(&id);
            let bytes = match contract.get_data(&key).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!("Error loading case {}: {}", id, e);
                    continue;
                }
            };
            if bytes.is_empty() {
                debug!("Index lists {} but {} is empty", id, key);
                continue;
            }
            match serde_json::from_slice::<StoredCase>(&bytes) {
                Ok(stored) => cases.push(CaseRecord::from_stored(id, stored)),
                Err(e) => error!("Error parsing case data for {}: {}", id, e),
            }
        }

        sort_newest_first(&mut cases);
        debug!("Loaded {} cases", cases.len());
        cases
    }

    /// Read one case by id. `Ok(None)` when nothing is stored at its key.
    pub async fn get(&self, id: &str) -> Result<Option<CaseRecord>> {
        let contract = self
            .provider
            .read_only()
            .await
            .ok_or_else(|| CaseStoreError::RemoteFailure("Contract is not available".to_string()))?;
        let key = self.record_key(id);
        let bytes = contract.get_data(&key).await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let stored: StoredCase =
            serde_json::from_slice(&bytes).map_err(|e| CaseStoreError::decode(&key, e))?;
        Ok(Some(CaseRecord::from_stored(id, stored)))
    }

    /// Persist a new case and append its id to the index. Returns the new id.
    pub async fn save(&self, draft: &CaseDraft) -> Result<String> {
        let contract = self
            .provider
            .with_signer()
            .await
            .ok_or(CaseStoreError::SigningUnavailable)?;

        let payload = self.codec.encode(draft)?;
        let id = self.generate_id();
        let stored = StoredCase {
            data: payload,
            timestamp: chrono::Utc::now().timestamp(),
            jurisdiction: draft.jurisdiction.clone(),
            crime_type: draft.crime_type.clone(),
            outcome: draft.outcome.clone(),
            fhe_analysis: Some(PENDING_ANALYSIS.to_string()),
        };
        let record_bytes =
            serde_json::to_vec(&stored).map_err(|e| CaseStoreError::decode(self.record_key(&id), e))?;

        let receipt = contract.set_data(&self.record_key(&id), &record_bytes).await?;
        debug!("Case {} written (tx #{})", id, receipt.sequence);

        let index_bytes = contract.get_data(self.index_key()).await?;
        let mut ids = self.decode_index(&index_bytes);
        ids.push(id.clone());
        self.write_index(contract.as_ref(), &ids).await?;

        info!("Submitted case {} ({} indexed)", id, ids.len());
        Ok(id)
    }

    /// Replace the analysis text of an existing case. The index is untouched.
    ///
    /// Fields this client does not know about are carried over unchanged.
    pub async fn attach_analysis(&self, id: &str, analysis: &str) -> Result<()> {
        let contract = self
            .provider
            .with_signer()
            .await
            .ok_or(CaseStoreError::SigningUnavailable)?;

        let key = self.record_key(id);
        let bytes = contract.get_data(&key).await?;
        if bytes.is_empty() {
            return Err(CaseStoreError::RecordNotFound(id.to_string()));
        }

        let mut object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&bytes).map_err(|e| CaseStoreError::decode(&key, e))?;
        object.insert(
            "fheAnalysis".to_string(),
            serde_json::Value::String(analysis.to_string()),
        );
        let updated = serde_json::to_vec(&object).map_err(|e| CaseStoreError::decode(&key, e))?;

        contract.set_data(&key, &updated).await?;
        info!("Attached analysis to case {}", id);
        Ok(())
    }

    /// `<unix millis>-<random base36 suffix>`. Collisions are improbable, not
    /// impossible.
    pub fn generate_id(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..self.config.id_suffix_len)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        format!("{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
    }

    fn decode_index(&self, bytes: &[u8]) -> Vec<String> {
        if bytes.is_empty() {
            return Vec::new();
        }
        match serde_json::from_slice::<Vec<String>>(bytes) {
            Ok(ids) => ids,
            Err(e) => {
                error!("Error parsing case keys: {}", e);
                Vec::new()
            }
        }
    }

    async fn write_index(&self, contract: &dyn ContractInterface, ids: &[String]) -> Result<()> {
        let bytes =
            serde_json::to_vec(ids).map_err(|e| CaseStoreError::decode(self.index_key(), e))?;
        contract.set_data(self.index_key(), &bytes).await?;
        Ok(())
    }
}

/// Newest first; the sort is stable so equal timestamps keep index order.
pub fn sort_newest_first(cases: &mut [CaseRecord]) {
    cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
