//! Safety rules and legal banners for redclaw.
//!
//! The engine classifies prompts and candidate commands as allow, warn, or
//! block. Evaluation is pure: same input and configuration always produce
//! the same decision, so every rule is unit-testable offline.

pub mod anonymise;
pub mod engine;

pub use anonymise::anonymise_ips;
pub use engine::{
    PolicyConfig, PolicyDecision, PolicyEngine, Subject, SubjectKind, Verdict, LEGAL_BANNER,
};
