//! Case records
//!
//! [`CaseRecord`] is the in-memory view handed to the presentation layer;
//! [`StoredCase`] is the exact JSON object kept on-chain under `case_<id>`.

use serde::{Deserialize, Deserializer, Serialize};

/// Analysis text of every record until an analysis result is attached.
pub const PENDING_ANALYSIS: &str = "Pending FHE Analysis";

/// Where a record sits in its analysis lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisState {
    Pending,
    Completed,
}

impl AnalysisState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Case form contents collected before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDraft {
    pub jurisdiction: String,
    pub crime_type: String,
    pub outcome: String,
    pub details: String,
}

impl CaseDraft {
    pub fn new(
        jurisdiction: impl Into<String>,
        crime_type: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            crime_type: crime_type.into(),
            outcome: outcome.into(),
            details: String::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Required fields still empty; details are optional.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.jurisdiction.trim().is_empty() {
            missing.push("jurisdiction");
        }
        if self.crime_type.trim().is_empty() {
            missing.push("crimeType");
        }
        if self.outcome.trim().is_empty() {
            missing.push("outcome");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// On-chain JSON layout of one case.
///
/// Reading is lenient: other clients write these objects too, so missing or
/// null strings read as empty and a fractional timestamp is truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCase {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: String,
    #[serde(deserialize_with = "whole_seconds")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub jurisdiction: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub crime_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fhe_analysis: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn whole_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(i64),
        Fractional(f64),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Whole(secs) => Ok(secs),
        Seconds::Fractional(secs) if secs.is_finite() => Ok(secs.trunc() as i64),
        Seconds::Fractional(secs) => Err(serde::de::Error::custom(format!(
            "timestamp {} is not a finite number",
            secs
        ))),
    }
}

/// A case as loaded from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: String,
    /// Encoded draft contents; opaque to the store
    pub payload: String,
    /// Seconds since the Unix epoch
    pub created_at: i64,
    pub jurisdiction: String,
    pub crime_type: String,
    pub outcome: String,
    pub analysis: String,
}

impl CaseRecord {
    pub fn from_stored(id: impl Into<String>, stored: StoredCase) -> Self {
        Self {
            id: id.into(),
            payload: stored.data,
            created_at: stored.timestamp,
            jurisdiction: stored.jurisdiction,
            crime_type: stored.crime_type,
            outcome: stored.outcome,
            analysis: stored
                .fhe_analysis
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| PENDING_ANALYSIS.to_string()),
        }
    }

    pub fn analysis_state(&self) -> AnalysisState {
        if self.analysis == PENDING_ANALYSIS {
            AnalysisState::Pending
        } else {
            AnalysisState::Completed
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.analysis_state() == AnalysisState::Completed
    }

    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.created_at, 0)
    }
}
