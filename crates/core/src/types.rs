use serde::{Deserialize, Serialize};

/// Risk classification assigned by the policy engine at suggestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Terminal outcome of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Executed,
    Declined,
    Blocked,
    Failed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Executed => "executed",
            Outcome::Declined => "declined",
            Outcome::Blocked => "blocked",
            Outcome::Failed => "failed",
        }
    }
}

/// One proposed command before it receives a batch-scoped id.
///
/// `risk_level` is assigned by the policy engine before the draft reaches
/// the store; the store only hands out ids and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionDraft {
    pub tool: String,
    pub command_text: String,
    pub rationale: String,
    pub risk_level: RiskLevel,
}

/// One cached suggestion, resolvable by id within its batch's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Dense 1-based id, unique within the batch only.
    pub id: u32,
    pub tool: String,
    pub command_text: String,
    pub rationale: String,
    pub risk_level: RiskLevel,
}

/// One immutable record of an attempted command execution.
///
/// `command_text` is the literal form that was (or would have been)
/// executed; `displayed_command_text` is the form shown to the user and
/// in reports, which differs only when IP anonymisation is enabled.
/// Unknown trailing fields are tolerated on read so the on-disk schema
/// can grow additively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 timestamp of the attempt.
    pub timestamp: String,
    /// Calendar-date session id, `YYYY-MM-DD`.
    pub session_id: String,
    /// Id of the backing suggestion; `None` for ad hoc commands.
    pub suggestion_id: Option<u32>,
    pub tool: String,
    pub command_text: String,
    pub displayed_command_text: String,
    pub outcome: Outcome,
    pub exit_code: Option<i32>,
    pub output_excerpt: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub important: bool,
}
