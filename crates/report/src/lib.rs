//! Markdown report skeletons built from a session's audit log.
//!
//! The builder only reads; the JSONL record stream stays the single source
//! of truth. Identical log contents always render to an identical document
//! apart from the generation timestamp header, so reports are safe to
//! regenerate and diff.

use chrono::{DateTime, Local};
use redclaw_audit::{AuditError, AuditLogger};
use redclaw_core::{LogEntry, Outcome};
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("no audit log for session {0}")]
    NotFound(String),
    #[error(transparent)]
    Audit(AuditError),
}

pub struct ReportBuilder<'a> {
    audit: &'a AuditLogger,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(audit: &'a AuditLogger) -> Self {
        Self { audit }
    }

    /// Render the session's report.
    ///
    /// `NotFound` means the session file does not exist; an existing file
    /// with zero entries yields a valid empty report, so "no activity" and
    /// "bad date" stay distinguishable.
    pub fn build(&self, session_id: &str) -> Result<String, ReportError> {
        let entries = self.audit.read_session(session_id).map_err(|e| match e {
            AuditError::NotFound(s) => ReportError::NotFound(s),
            other => ReportError::Audit(other),
        })?;
        Ok(render(session_id, &entries))
    }
}

fn render(session_id: &str, entries: &[LogEntry]) -> String {
    let mut doc = String::new();
    let _ = writeln!(doc, "# Security Testing Report — {session_id}");
    let _ = writeln!(doc);
    let _ = writeln!(
        doc,
        "Generated: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(doc);

    render_executed(&mut doc, entries);
    render_declined_blocked(&mut doc, entries);
    render_notes_of_interest(&mut doc, entries);

    doc
}

fn render_executed(doc: &mut String, entries: &[LogEntry]) {
    let _ = writeln!(doc, "## Executed Commands");
    let _ = writeln!(doc);

    let executed: Vec<&LogEntry> = entries
        .iter()
        .filter(|e| matches!(e.outcome, Outcome::Executed | Outcome::Failed))
        .collect();

    if executed.is_empty() {
        let _ = writeln!(doc, "No commands were executed this session.");
        let _ = writeln!(doc);
        return;
    }

    // Tools in first-appearance order, entries in append order within each.
    let mut tools: Vec<&str> = Vec::new();
    for entry in &executed {
        if !tools.contains(&entry.tool.as_str()) {
            tools.push(&entry.tool);
        }
    }

    for tool in tools {
        let _ = writeln!(doc, "### {tool}");
        let _ = writeln!(doc);
        for entry in executed.iter().filter(|e| e.tool == tool) {
            let exit = match entry.exit_code {
                Some(code) => format!("exit {code}"),
                None => "no exit code".to_string(),
            };
            let _ = writeln!(
                doc,
                "- {} `{}` ({exit})",
                time_of(entry),
                entry.displayed_command_text
            );
            if let Some(notes) = &entry.notes {
                let _ = writeln!(doc, "  - note: {notes}");
            }
            if let Some(excerpt) = &entry.output_excerpt {
                let _ = writeln!(doc, "  ```");
                for line in excerpt.lines() {
                    let _ = writeln!(doc, "  {line}");
                }
                let _ = writeln!(doc, "  ```");
            }
        }
        let _ = writeln!(doc);
    }
}

fn render_declined_blocked(doc: &mut String, entries: &[LogEntry]) {
    let _ = writeln!(doc, "## Declined & Blocked");
    let _ = writeln!(doc);

    let skipped: Vec<&LogEntry> = entries
        .iter()
        .filter(|e| matches!(e.outcome, Outcome::Declined | Outcome::Blocked))
        .collect();

    if skipped.is_empty() {
        let _ = writeln!(doc, "No attempts were declined or blocked.");
        let _ = writeln!(doc);
        return;
    }

    for entry in skipped {
        let mut line = format!(
            "- {} {} `{}`",
            time_of(entry),
            entry.outcome.as_str(),
            entry.displayed_command_text
        );
        if let Some(notes) = &entry.notes {
            line.push_str(&format!(" — {notes}"));
        }
        let _ = writeln!(doc, "{line}");
    }
    let _ = writeln!(doc);
}

fn render_notes_of_interest(doc: &mut String, entries: &[LogEntry]) {
    let _ = writeln!(doc, "## Notes of Interest");
    let _ = writeln!(doc);

    let flagged: Vec<&LogEntry> = entries.iter().filter(|e| e.important).collect();
    if flagged.is_empty() {
        let _ = writeln!(doc, "No entries were flagged.");
        return;
    }

    for entry in flagged {
        let note = entry.notes.as_deref().unwrap_or("flagged for follow-up");
        let _ = writeln!(doc, "- `{}` — {note}", entry.displayed_command_text);
    }
}

fn time_of(entry: &LogEntry) -> String {
    DateTime::parse_from_rfc3339(&entry.timestamp)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| entry.timestamp.clone())
}
