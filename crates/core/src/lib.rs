//! Shared data model for the redclaw pipeline.
//!
//! Every member crate exchanges these types: suggestions flow from the
//! backend into the store, log entries flow from the executor into the
//! audit trail and out through the report builder.

pub mod session;
pub mod types;

pub use session::{resolve_session_arg, session_id_for, today_session_id};
pub use types::{LogEntry, Outcome, RiskLevel, Suggestion, SuggestionDraft};
