use redclaw_audit::{AuditError, AuditLogger};
use redclaw_core::{LogEntry, Outcome};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn entry(session: &str, command: &str, outcome: Outcome) -> LogEntry {
    LogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        session_id: session.to_string(),
        suggestion_id: None,
        tool: command.split_whitespace().next().unwrap_or("sh").to_string(),
        command_text: command.to_string(),
        displayed_command_text: command.to_string(),
        outcome,
        exit_code: match outcome {
            Outcome::Executed => Some(0),
            Outcome::Failed => Some(1),
            _ => None,
        },
        output_excerpt: None,
        notes: None,
        important: false,
    }
}

fn record_lines(dir: &TempDir, session: &str) -> Vec<String> {
    let file = File::open(dir.path().join(format!("{session}.jsonl"))).unwrap();
    BufReader::new(file).lines().map(|l| l.unwrap()).collect()
}

#[test]
fn append_single_entry() {
    let dir = TempDir::new().unwrap();
    let logger = AuditLogger::new(dir.path()).unwrap();

    logger
        .append(&entry("2026-08-05", "nmap -sn 10.0.0.5", Outcome::Executed))
        .unwrap();

    assert_eq!(record_lines(&dir, "2026-08-05").len(), 1);
}

#[test]
fn appends_survive_logger_restarts() {
    let dir = TempDir::new().unwrap();

    {
        let logger = AuditLogger::new(dir.path()).unwrap();
        logger
            .append(&entry("2026-08-05", "nmap -sn 10.0.0.5", Outcome::Executed))
            .unwrap();
    }
    {
        let logger = AuditLogger::new(dir.path()).unwrap();
        logger
            .append(&entry("2026-08-05", "nikto -h 10.0.0.5", Outcome::Declined))
            .unwrap();
    }

    let lines = record_lines(&dir, "2026-08-05");
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("nmap"));
    assert!(lines[1].contains("nikto"));
}

#[test]
fn concurrent_appends_never_tear_records() {
    let dir = TempDir::new().unwrap();
    let logger = Arc::new(AuditLogger::new(dir.path()).unwrap());

    let mut handles = vec![];
    for i in 0..16 {
        let logger = Arc::clone(&logger);
        handles.push(thread::spawn(move || {
            logger
                .append(&entry(
                    "2026-08-05",
                    &format!("echo writer-{i}"),
                    Outcome::Executed,
                ))
                .unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = record_lines(&dir, "2026-08-05");
    assert_eq!(lines.len(), 16);
    for line in lines {
        // Every line must be a complete, parseable record.
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["session_id"], "2026-08-05");
    }
}

#[test]
fn record_fields_round_trip() {
    let dir = TempDir::new().unwrap();
    let logger = AuditLogger::new(dir.path()).unwrap();

    let mut e = entry("2026-08-05", "gobuster dir -u http://10.0.0.5", Outcome::Failed);
    e.suggestion_id = Some(3);
    e.notes = Some("wordlist missing".to_string());
    e.important = true;
    logger.append(&e).unwrap();

    let replayed = logger.read_session("2026-08-05").unwrap();
    assert_eq!(replayed.len(), 1);
    assert_eq!(replayed[0].suggestion_id, Some(3));
    assert_eq!(replayed[0].outcome, Outcome::Failed);
    assert_eq!(replayed[0].notes.as_deref(), Some("wordlist missing"));
    assert!(replayed[0].important);
}

#[test]
fn markdown_trail_mirrors_record_order() {
    let dir = TempDir::new().unwrap();
    let logger = AuditLogger::new(dir.path()).unwrap();

    logger
        .append(&entry("2026-08-05", "nmap -sn 10.0.0.5", Outcome::Executed))
        .unwrap();
    logger
        .append(&entry("2026-08-05", "nikto -h 10.0.0.5", Outcome::Declined))
        .unwrap();

    let trail = std::fs::read_to_string(dir.path().join("2026-08-05.md")).unwrap();
    let nmap_at = trail.find("nmap").unwrap();
    let nikto_at = trail.find("nikto").unwrap();
    assert!(nmap_at < nikto_at);
    assert!(trail.starts_with("# redclaw audit trail"));
}

#[test]
fn read_session_skips_corrupt_lines() {
    let dir = TempDir::new().unwrap();
    let logger = AuditLogger::new(dir.path()).unwrap();

    logger
        .append(&entry("2026-08-05", "nmap -sn 10.0.0.5", Outcome::Executed))
        .unwrap();

    // A hand-edited log is tolerated as read-only replay.
    let path = dir.path().join("2026-08-05.jsonl");
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "this is not json").unwrap();

    logger
        .append(&entry("2026-08-05", "nikto -h 10.0.0.5", Outcome::Executed))
        .unwrap();

    let replayed = logger.read_session("2026-08-05").unwrap();
    assert_eq!(replayed.len(), 2);
}

#[test]
fn missing_session_is_not_found() {
    let dir = TempDir::new().unwrap();
    let logger = AuditLogger::new(dir.path()).unwrap();
    assert!(matches!(
        logger.read_session("2020-01-01"),
        Err(AuditError::NotFound(_))
    ));
}

#[test]
fn ensure_session_creates_artifacts() {
    let dir = TempDir::new().unwrap();
    let logger = AuditLogger::new(dir.path()).unwrap();

    assert!(!logger.session_exists("2026-08-05"));
    logger.ensure_session("2026-08-05").unwrap();
    assert!(logger.session_exists("2026-08-05"));
    assert!(dir.path().join("2026-08-05.md").exists());

    // First append still counts exactly one record.
    logger
        .append(&entry("2026-08-05", "nmap -sn 10.0.0.5", Outcome::Executed))
        .unwrap();
    assert_eq!(record_lines(&dir, "2026-08-05").len(), 1);
}

#[test]
fn sessions_are_isolated_by_date() {
    let dir = TempDir::new().unwrap();
    let logger = AuditLogger::new(dir.path()).unwrap();

    logger
        .append(&entry("2026-08-04", "nmap -sn 10.0.0.5", Outcome::Executed))
        .unwrap();
    logger
        .append(&entry("2026-08-05", "nikto -h 10.0.0.5", Outcome::Executed))
        .unwrap();

    assert_eq!(logger.read_session("2026-08-04").unwrap().len(), 1);
    assert_eq!(logger.read_session("2026-08-05").unwrap().len(), 1);
}
