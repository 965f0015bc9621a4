use crate::confirm::{Confirm, ConfirmRequest};
use chrono::Utc;
use redclaw_audit::{AuditError, AuditLogger};
use redclaw_core::{today_session_id, LogEntry, Outcome, Suggestion};
use redclaw_policy::{PolicyEngine, Subject, Verdict};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

const TRUNCATION_MARKER: &str = "… [truncated]";

#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The audit trail could not be written. Raised before execution when
    /// the session file cannot be opened, or after execution when the
    /// best-effort record write fails.
    #[error("audit log unavailable: {0}")]
    Audit(#[from] AuditError),
}

#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Ceiling for a running command; expiry kills it and records a
    /// Failed outcome with a timeout note. `None` lets commands run
    /// unbounded.
    pub command_timeout: Option<Duration>,
    /// Character budget for the captured output excerpt. Longer output is
    /// cut with an explicit marker, never silently dropped.
    pub excerpt_limit: usize,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            command_timeout: Some(Duration::from_secs(300)),
            excerpt_limit: 2000,
        }
    }
}

/// What to run: a cached suggestion or an ad hoc literal command.
#[derive(Debug, Clone)]
pub enum RunTarget {
    Suggestion(Suggestion),
    AdHoc { command: String },
}

impl RunTarget {
    fn command_text(&self) -> &str {
        match self {
            RunTarget::Suggestion(s) => &s.command_text,
            RunTarget::AdHoc { command } => command,
        }
    }

    fn tool(&self) -> String {
        match self {
            RunTarget::Suggestion(s) => s.tool.clone(),
            RunTarget::AdHoc { command } => command
                .split_whitespace()
                .next()
                .unwrap_or("sh")
                .to_string(),
        }
    }

    fn suggestion_id(&self) -> Option<u32> {
        match self {
            RunTarget::Suggestion(s) => Some(s.id),
            RunTarget::AdHoc { .. } => None,
        }
    }

    fn rationale(&self) -> Option<&str> {
        match self {
            RunTarget::Suggestion(s) => Some(s.rationale.as_str()),
            RunTarget::AdHoc { .. } => None,
        }
    }
}

/// Per-run flags from the CLI surface.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip the base confirmation. Warn-level acknowledgment is still
    /// required and block verdicts are unaffected.
    pub assume_yes: bool,
    pub notes: Option<String>,
    pub important: bool,
}

/// What the caller gets back for display and exit-code mapping.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: Outcome,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Policy reasons for blocked runs and acknowledged warnings.
    pub reasons: Vec<String>,
    pub displayed_command: String,
}

pub struct RunExecutor<'a> {
    policy: &'a PolicyEngine,
    audit: &'a AuditLogger,
    options: ExecutorOptions,
}

struct ExecCapture {
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
    failure_note: Option<String>,
}

impl<'a> RunExecutor<'a> {
    pub fn new(policy: &'a PolicyEngine, audit: &'a AuditLogger, options: ExecutorOptions) -> Self {
        Self {
            policy,
            audit,
            options,
        }
    }

    /// Drive one target through the state machine. Every terminal state
    /// appends exactly one log entry before this returns.
    pub async fn run(
        &self,
        target: RunTarget,
        confirm: &dyn Confirm,
        opts: RunOptions,
    ) -> Result<RunReport, ExecutorError> {
        let session_id = today_session_id();
        // The audit invariant comes first: if the session log cannot be
        // opened, nothing may execute.
        self.audit.ensure_session(&session_id)?;

        let command = target.command_text().to_string();
        let tool = target.tool();
        let displayed = self.policy.display_text(&command);

        // Re-evaluation is mandatory even for suggestions checked at
        // proposal time; configuration may have changed since.
        let subject = match &target {
            RunTarget::Suggestion(s) => Subject::command_for_tool(&command, &s.tool),
            RunTarget::AdHoc { .. } => Subject::command(&command),
        };
        let decision = self.policy.evaluate(&subject);
        tracing::debug!(verdict = decision.verdict.as_str(), %tool, "policy re-check");

        if decision.verdict == Verdict::Block {
            let entry = self.entry(
                &session_id,
                &target,
                &tool,
                &command,
                &displayed,
                Outcome::Blocked,
                None,
                None,
                Some(decision.reasons.join("; ")),
                &opts,
            );
            self.audit.append(&entry)?;
            return Ok(RunReport {
                outcome: Outcome::Blocked,
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                reasons: decision.reasons,
                displayed_command: displayed,
            });
        }

        let request = ConfirmRequest {
            tool: &tool,
            displayed_command: &displayed,
            rationale: target.rationale(),
        };

        tracing::debug!("awaiting confirmation");
        let mut confirmed = true;
        if decision.verdict == Verdict::Warn {
            confirmed = confirm
                .acknowledge_warnings(&request, &decision.reasons)
                .await;
        }
        if confirmed && !opts.assume_yes {
            confirmed = confirm.confirm_run(&request).await;
        }

        if !confirmed {
            let entry = self.entry(
                &session_id,
                &target,
                &tool,
                &command,
                &displayed,
                Outcome::Declined,
                None,
                None,
                opts.notes.clone(),
                &opts,
            );
            self.audit.append(&entry)?;
            return Ok(RunReport {
                outcome: Outcome::Declined,
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                reasons: decision.reasons,
                displayed_command: displayed,
            });
        }

        tracing::info!(%tool, "executing");
        // The literal command runs; the anonymised form is display-only.
        let capture = self.execute(&command).await;

        let outcome = match capture.exit_code {
            Some(0) => Outcome::Executed,
            _ => Outcome::Failed,
        };
        let excerpt = self.excerpt_of(&capture);
        let notes = match (&capture.failure_note, &opts.notes) {
            (Some(failure), Some(user)) => Some(format!("{failure}; {user}")),
            (Some(failure), None) => Some(failure.clone()),
            (None, user) => user.clone(),
        };

        let entry = self.entry(
            &session_id,
            &target,
            &tool,
            &command,
            &displayed,
            outcome,
            capture.exit_code,
            excerpt,
            notes,
            &opts,
        );
        self.audit.append(&entry)?;

        Ok(RunReport {
            outcome,
            exit_code: capture.exit_code,
            stdout: capture.stdout,
            stderr: capture.stderr,
            reasons: decision.reasons,
            displayed_command: displayed,
        })
    }

    async fn execute(&self, command: &str) -> ExecCapture {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.options.command_timeout {
            Some(ceiling) => match timeout(ceiling, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(seconds = ceiling.as_secs(), "command hit timeout ceiling");
                    return ExecCapture {
                        exit_code: None,
                        stdout: String::new(),
                        stderr: String::new(),
                        failure_note: Some(format!(
                            "timed out after {}s",
                            ceiling.as_secs()
                        )),
                    };
                }
            },
            None => cmd.output().await,
        };

        match output {
            Ok(output) => ExecCapture {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                failure_note: None,
            },
            Err(e) => ExecCapture {
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                failure_note: Some(format!("failed to spawn: {e}")),
            },
        }
    }

    fn excerpt_of(&self, capture: &ExecCapture) -> Option<String> {
        let mut combined = capture.stdout.clone();
        if !capture.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&capture.stderr);
        }
        let combined = combined.trim_end().to_string();
        if combined.is_empty() {
            return None;
        }
        if combined.chars().count() <= self.options.excerpt_limit {
            return Some(combined);
        }
        let cut: String = combined.chars().take(self.options.excerpt_limit).collect();
        Some(format!("{cut}\n{TRUNCATION_MARKER}"))
    }

    #[allow(clippy::too_many_arguments)]
    fn entry(
        &self,
        session_id: &str,
        target: &RunTarget,
        tool: &str,
        command: &str,
        displayed: &str,
        outcome: Outcome,
        exit_code: Option<i32>,
        output_excerpt: Option<String>,
        notes: Option<String>,
        opts: &RunOptions,
    ) -> LogEntry {
        LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            session_id: session_id.to_string(),
            suggestion_id: target.suggestion_id(),
            tool: tool.to_string(),
            command_text: command.to_string(),
            displayed_command_text: displayed.to_string(),
            outcome,
            exit_code,
            output_excerpt,
            notes,
            important: opts.important,
        }
    }
}
