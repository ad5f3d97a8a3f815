//! Application state and the controller driving it.
//!
//! The presentation layer never mutates state directly. It calls
//! [`CaseApp`] operations or dispatches an [`Action`], and renders whatever
//! [`AppState`] value the controller publishes next.

pub mod controller;
pub mod state;
pub mod view;

pub use controller::CaseApp;
pub use state::{Action, AppState, StatusKind, TransactionStatus, ALL_JURISDICTIONS};
pub use view::{filter_cases, matches_filter, CaseStats};
