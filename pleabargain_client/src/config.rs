use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::{CaseStoreError, Result};

/// Environment variable prefix for overrides, e.g. `PLEA__ANALYSIS__DELAY_MS=0`
pub const ENV_PREFIX: &str = "PLEA";

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub analysis: AnalysisConfig,
    pub status: StatusConfig,
    pub contract: ContractConfig,
    pub catalog: CatalogConfig,
}

/// Key layout of the case ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key holding the JSON array of case ids
    pub index_key: String,
    /// Prefix of per-case keys
    pub record_prefix: String,
    /// Length of the random suffix appended to generated ids
    pub id_suffix_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_key: "case_keys".to_string(),
            record_prefix: "case_".to_string(),
            id_suffix_len: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Simulated FHE computation time
    pub delay_ms: u64,
    pub result_lines: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delay_ms: 3000,
            result_lines: vec![
                "Fairness Score: 82%".to_string(),
                "Sentencing Disparity: Low".to_string(),
                "Prosecutor Bias: Moderate".to_string(),
                "Recommended Action: Review charging guidelines".to_string(),
            ],
        }
    }
}

impl AnalysisConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// How long transaction status lines stay visible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub success_dismiss_ms: u64,
    pub error_dismiss_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            success_dismiss_ms: 2000,
            error_dismiss_ms: 3000,
        }
    }
}

impl StatusConfig {
    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_dismiss_ms)
    }

    pub fn error_delay(&self) -> Duration {
        Duration::from_millis(self.error_dismiss_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Snapshot file used by the file-backed contract
    pub data_file: PathBuf,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/pleabargain_ledger.json"),
        }
    }
}

/// Classification values offered by the presentation layer.
/// The store itself accepts any string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub jurisdictions: Vec<String>,
    pub crime_types: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            jurisdictions: ["Federal", "State", "County", "Municipal"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            crime_types: ["Drug", "Property", "Violent", "White Collar", "Other"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CatalogConfig {
    pub fn is_known_jurisdiction(&self, value: &str) -> bool {
        self.jurisdictions.iter().any(|j| j == value)
    }

    pub fn is_known_crime_type(&self, value: &str) -> bool {
        self.crime_types.iter().any(|c| c == value)
    }
}

impl Config {
    /// Load a YAML file, then apply `PLEA__*` environment overrides.
    pub fn from_file(path: &str) -> Result<Self> {
        Self::build(Some(Path::new(path)))
    }

    /// Like [`Config::from_file`], but defaults stand in for a missing file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::build(Some(p)),
            Some(p) => {
                log::info!("Config file {:?} not found, using defaults", p);
                Self::build(None)
            }
            None => Self::build(None),
        }
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config: Config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| CaseStoreError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.index_key.is_empty() {
            return Err(CaseStoreError::Config("store.index_key must not be empty".to_string()));
        }
        if self.store.record_prefix.is_empty() {
            return Err(CaseStoreError::Config(
                "store.record_prefix must not be empty".to_string(),
            ));
        }
        if self.store.id_suffix_len == 0 {
            return Err(CaseStoreError::Config(
                "store.id_suffix_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
