mod error;

pub use error::{CaseStoreError as Error, CaseStoreError, Result};
