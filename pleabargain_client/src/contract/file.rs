use super::{ContractError, ContractInterface, Result, TxReceipt};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Contract state persisted as a JSON snapshot of hex-encoded values.
///
/// Lets the CLI keep its ledger between runs without a chain connection.
/// Every write rewrites the whole snapshot through a temporary file.
pub struct FileContract {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    sequence: AtomicU64,
}

impl FileContract {
    /// Open the snapshot at `path`, starting empty when the file is absent.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => Self::decode_snapshot(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No contract snapshot at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Err(e) => {
                return Err(ContractError::Remote(format!(
                    "Failed to read {:?}: {}",
                    path, e
                )))
            }
        };

        debug!("Opened contract snapshot {:?} with {} keys", path, entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
            sequence: AtomicU64::new(0),
        })
    }

    fn decode_snapshot(bytes: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
        let encoded: BTreeMap<String, String> = serde_json::from_slice(bytes)
            .map_err(|e| ContractError::Remote(format!("Corrupt contract snapshot: {}", e)))?;
        encoded
            .into_iter()
            .map(|(key, value)| {
                hex::decode(&value)
                    .map(|bytes| (key.clone(), bytes))
                    .map_err(|e| {
                        ContractError::Remote(format!("Corrupt value for {}: {}", key, e))
                    })
            })
            .collect()
    }

    async fn persist(&self, entries: &BTreeMap<String, Vec<u8>>) -> Result<()> {
        let encoded: BTreeMap<&str, String> = entries
            .iter()
            .map(|(key, value)| (key.as_str(), hex::encode(value)))
            .collect();
        let json = serde_json::to_vec_pretty(&encoded)
            .map_err(|e| ContractError::Remote(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ContractError::Remote(e.to_string()))?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| ContractError::Remote(format!("Failed to write {:?}: {}", tmp, e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ContractError::Remote(format!("Failed to commit {:?}: {}", self.path, e)))
    }
}

#[async_trait]
impl ContractInterface for FileContract {
    async fn is_available(&self) -> bool {
        true
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        Ok(self.entries.lock().await.get(key).cloned().unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<TxReceipt> {
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(key.to_string(), value.to_vec());
        if let Err(e) = self.persist(&entries).await {
            // Keep memory in step with what is on disk.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TxReceipt {
            key: key.to_string(),
            bytes_written: value.len(),
            sequence,
        })
    }
}
