//! Append-only audit trail.
//!
//! Each session (one local calendar day) owns two co-located artifacts:
//! `<dir>/<date>.jsonl`, the authoritative line-delimited record stream,
//! and `<dir>/<date>.md`, a human-readable trail with the same entries in
//! the same order. Appends take an exclusive advisory lock on the JSONL
//! file for the duration of a single record write, so concurrent redclaw
//! invocations in separate terminals never interleave partial records.
//! The logger never deletes or rotates session files.

use chrono::DateTime;
use fs2::FileExt;
use parking_lot::Mutex;
use redclaw_core::{LogEntry, Outcome};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no audit log for session {0}")]
    NotFound(String),
}

pub struct AuditLogger {
    log_dir: PathBuf,
    // Serializes appends inside one process; the file lock covers other
    // processes.
    write_guard: Mutex<()>,
}

impl AuditLogger {
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Result<Self, AuditError> {
        let log_dir = log_dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir)?;
        Ok(Self {
            log_dir,
            write_guard: Mutex::new(()),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn record_path(&self, session_id: &str) -> PathBuf {
        self.log_dir.join(format!("{session_id}.jsonl"))
    }

    fn trail_path(&self, session_id: &str) -> PathBuf {
        self.log_dir.join(format!("{session_id}.md"))
    }

    pub fn session_exists(&self, session_id: &str) -> bool {
        self.record_path(session_id).exists()
    }

    /// Open (creating if missing) the session's artifacts.
    ///
    /// The executor calls this before spawning a process: if the log file
    /// cannot be opened for append, nothing may run.
    pub fn ensure_session(&self, session_id: &str) -> Result<(), AuditError> {
        let _guard = self.write_guard.lock();
        let record = open_append(&self.record_path(session_id))?;
        record.lock_exclusive()?;
        let result = self.ensure_trail_header(session_id);
        let _ = FileExt::unlock(&record);
        result
    }

    /// Append one entry to both artifacts as a single locked operation.
    pub fn append(&self, entry: &LogEntry) -> Result<(), AuditError> {
        let json = serde_json::to_string(entry)?;

        let _guard = self.write_guard.lock();
        let mut record = open_append(&self.record_path(&entry.session_id))?;
        record.lock_exclusive()?;

        let result = (|| -> Result<(), AuditError> {
            writeln!(record, "{json}")?;
            record.sync_all()?;

            self.ensure_trail_header(&entry.session_id)?;
            let mut trail = open_append(&self.trail_path(&entry.session_id))?;
            writeln!(trail, "{}", trail_line(entry))?;
            trail.sync_all()?;
            Ok(())
        })();

        let _ = FileExt::unlock(&record);
        result
    }

    /// Replay one session's entries in append order.
    ///
    /// Corrupt lines (e.g. hand-edited) are skipped; unknown fields in
    /// valid lines are tolerated.
    pub fn read_session(&self, session_id: &str) -> Result<Vec<LogEntry>, AuditError> {
        let path = self.record_path(session_id);
        if !path.exists() {
            return Err(AuditError::NotFound(session_id.to_string()));
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(error = %e, "skipping corrupt audit line"),
            }
        }
        Ok(entries)
    }

    fn ensure_trail_header(&self, session_id: &str) -> Result<(), AuditError> {
        let path = self.trail_path(session_id);
        let mut trail = open_append(&path)?;
        if trail.metadata()?.len() == 0 {
            writeln!(trail, "# redclaw audit trail — {session_id}\n")?;
        }
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// One human-readable line per entry, mirroring the JSONL order.
fn trail_line(entry: &LogEntry) -> String {
    let time = DateTime::parse_from_rfc3339(&entry.timestamp)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| entry.timestamp.clone());

    let mut line = format!(
        "- {time} {} `{}`",
        entry.outcome.as_str(),
        entry.displayed_command_text
    );
    match entry.outcome {
        Outcome::Executed | Outcome::Failed => {
            if let Some(code) = entry.exit_code {
                line.push_str(&format!(" (exit {code})"));
            } else {
                line.push_str(" (no exit code)");
            }
        }
        Outcome::Declined | Outcome::Blocked => {}
    }
    if let Some(notes) = &entry.notes {
        line.push_str(&format!(" — {notes}"));
    }
    if entry.important {
        line.push_str(" [important]");
    }
    line
}
