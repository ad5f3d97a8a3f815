//! PleaBargainFHE case ledger client
//!
//! Case records live on a key/value smart contract: one JSON object per case
//! under `case_<id>` plus a JSON array of ids under `case_keys`. This crate
//! reads and writes that layout, tracks the connected wallet, and runs the
//! simulated FHE fairness analysis.
//!
//! Nothing here is real homomorphic encryption; payloads are base64 encoded
//! behind a swappable [`codec::PayloadCodec`].

pub mod analysis;
pub mod app;
pub mod codec;
pub mod common;
pub mod config;
pub mod contract;
pub mod record;
pub mod store;
pub mod wallet;

pub use common::{CaseStoreError, Error, Result};
pub use config::Config;
pub use record::{AnalysisState, CaseDraft, CaseRecord, PENDING_ANALYSIS};
pub use store::CaseStore;
