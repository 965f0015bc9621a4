//! File-backed cache for the latest suggestion batch.
//!
//! One batch is live at a time. Storing a new batch atomically replaces the
//! previous one (temp file + rename), so a concurrent reader in another
//! process sees either the old or the new complete batch, never a torn
//! write. Batches expire after a configured validity window so stale ids
//! from an old session can never resolve to a command the user is no longer
//! looking at.

use chrono::{DateTime, Duration, Utc};
use redclaw_core::{Suggestion, SuggestionDraft};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BATCH_FILE: &str = "suggestions.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("suggestion id {0} not found in the latest batch")]
    NotFound(u32),
    #[error("the latest suggestion batch expired at {0}")]
    Expired(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed batch file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One stored batch: the ordered suggestions plus its validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub suggestions: Vec<Suggestion>,
}

impl Batch {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

pub struct SuggestionStore {
    file: PathBuf,
    ttl: Duration,
}

impl SuggestionStore {
    /// Open a store rooted at `dir`. The directory is created if missing.
    pub fn new<P: AsRef<Path>>(dir: P, ttl_minutes: i64) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            file: dir.join(BATCH_FILE),
            ttl: Duration::minutes(ttl_minutes),
        })
    }

    /// Store a new batch, assigning dense 1-based ids in display order.
    ///
    /// The previous batch is invalidated by the same rename that publishes
    /// the new one. An empty draft list is accepted and produces a batch
    /// with zero resolvable ids. Duplicate command text across drafts is
    /// preserved: each entry carries its own rationale and risk context.
    pub fn put_batch(&self, drafts: Vec<SuggestionDraft>) -> Result<Batch, StoreError> {
        let now = Utc::now();
        let suggestions = drafts
            .into_iter()
            .enumerate()
            .map(|(i, d)| Suggestion {
                id: (i + 1) as u32,
                tool: d.tool,
                command_text: d.command_text,
                rationale: d.rationale,
                risk_level: d.risk_level,
            })
            .collect();

        let batch = Batch {
            created_at: now,
            expires_at: now + self.ttl,
            suggestions,
        };

        let tmp = self.file.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&batch)?)?;
        fs::rename(&tmp, &self.file)?;
        tracing::debug!(count = batch.suggestions.len(), "stored suggestion batch");

        Ok(batch)
    }

    /// Resolve an id against the latest batch.
    pub fn resolve(&self, id: u32) -> Result<Suggestion, StoreError> {
        let Some(batch) = self.latest()? else {
            return Err(StoreError::NotFound(id));
        };
        if batch.is_expired_at(Utc::now()) {
            return Err(StoreError::Expired(batch.expires_at.to_rfc3339()));
        }
        batch
            .suggestions
            .into_iter()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// The latest stored batch, expired or not. `None` when nothing has
    /// been stored yet.
    pub fn latest(&self) -> Result<Option<Batch>, StoreError> {
        if !self.file.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.file)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redclaw_core::RiskLevel;
    use tempfile::TempDir;

    fn draft(tool: &str, command: &str) -> SuggestionDraft {
        SuggestionDraft {
            tool: tool.to_string(),
            command_text: command.to_string(),
            rationale: format!("{tool} run"),
            risk_level: RiskLevel::Low,
        }
    }

    fn store(dir: &TempDir, ttl_minutes: i64) -> SuggestionStore {
        SuggestionStore::new(dir.path(), ttl_minutes).unwrap()
    }

    #[test]
    fn ids_are_dense_and_one_based() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 60);
        let batch = s
            .put_batch(vec![
                draft("nmap", "nmap -sn 10.0.0.0/24"),
                draft("nikto", "nikto -h 10.0.0.5"),
                draft("gobuster", "gobuster dir -u http://10.0.0.5"),
            ])
            .unwrap();

        let ids: Vec<u32> = batch.suggestions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn resolve_in_range_succeeds_out_of_range_not_found() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 60);
        s.put_batch(vec![draft("nmap", "nmap -sn 10.0.0.0/24"), draft("nikto", "nikto -h h")])
            .unwrap();

        assert_eq!(s.resolve(1).unwrap().tool, "nmap");
        assert_eq!(s.resolve(2).unwrap().tool, "nikto");
        assert!(matches!(s.resolve(0), Err(StoreError::NotFound(0))));
        assert!(matches!(s.resolve(3), Err(StoreError::NotFound(3))));
    }

    #[test]
    fn resolve_before_any_batch_is_not_found() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 60);
        assert!(matches!(s.resolve(1), Err(StoreError::NotFound(1))));
    }

    #[test]
    fn empty_batch_has_no_resolvable_ids() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 60);
        let batch = s.put_batch(Vec::new()).unwrap();
        assert!(batch.is_empty());
        assert!(matches!(s.resolve(1), Err(StoreError::NotFound(1))));
    }

    #[test]
    fn new_batch_invalidates_previous() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 60);
        s.put_batch(vec![
            draft("nmap", "nmap -sn 10.0.0.0/24"),
            draft("nikto", "nikto -h 10.0.0.5"),
            draft("gobuster", "gobuster dir -u http://10.0.0.5"),
        ])
        .unwrap();
        s.put_batch(vec![draft("whatweb", "whatweb 10.0.0.5")]).unwrap();

        // Old id 3 is outside the new dense range.
        assert!(matches!(s.resolve(3), Err(StoreError::NotFound(3))));
        // Id 1 now resolves to the new batch's entry.
        assert_eq!(s.resolve(1).unwrap().tool, "whatweb");
    }

    #[test]
    fn expired_batch_resolves_to_expired() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 0);
        s.put_batch(vec![draft("nmap", "nmap -sn 10.0.0.0/24")]).unwrap();
        assert!(matches!(s.resolve(1), Err(StoreError::Expired(_))));
    }

    #[test]
    fn duplicate_command_text_is_not_deduplicated() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 60);
        let mut second = draft("nmap", "nmap -sn 10.0.0.0/24");
        second.rationale = "slower, stealthier rerun".to_string();
        let batch = s
            .put_batch(vec![draft("nmap", "nmap -sn 10.0.0.0/24"), second])
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(
            s.resolve(1).unwrap().command_text,
            s.resolve(2).unwrap().command_text
        );
        assert_ne!(s.resolve(1).unwrap().rationale, s.resolve(2).unwrap().rationale);
    }

    #[test]
    fn same_id_resolves_repeatedly_until_replaced() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 60);
        s.put_batch(vec![draft("nmap", "nmap -sn 10.0.0.0/24")]).unwrap();

        let first = s.resolve(1).unwrap();
        let second = s.resolve(1).unwrap();
        assert_eq!(first.command_text, second.command_text);
    }

    #[test]
    fn batch_file_is_complete_json() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir, 60);
        s.put_batch(vec![draft("nmap", "nmap -sn 10.0.0.0/24")]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("suggestions.json")).unwrap();
        let parsed: Batch = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.suggestions.len(), 1);
        assert!(!dir.path().join("suggestions.tmp").exists());
    }
}
