//! Read-only shell-history context for prompt construction.
//!
//! The shell hook exports `REDCLAW_LAST_CMD`; without it the usual history
//! files are read directly. Nothing here is ever written back.

use std::path::PathBuf;

pub fn last_command() -> Option<String> {
    std::env::var("REDCLAW_LAST_CMD")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn recent_commands(limit: usize) -> Vec<String> {
    let Some(home) = std::env::var_os("HOME") else {
        return Vec::new();
    };
    let home = PathBuf::from(home);

    for file in [home.join(".bash_history"), home.join(".zsh_history")] {
        let Ok(raw) = std::fs::read_to_string(&file) else {
            continue;
        };
        let lines: Vec<String> = raw
            .lines()
            .map(strip_zsh_extended_format)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if !lines.is_empty() {
            let start = lines.len().saturating_sub(limit);
            return lines[start..].to_vec();
        }
    }
    Vec::new()
}

/// Numbered recent-commands block for the suggest prompt, or `None` when
/// no history is readable.
pub fn context_block(limit: usize) -> Option<String> {
    let commands = recent_commands(limit);
    if commands.is_empty() {
        return None;
    }
    Some(
        commands
            .iter()
            .enumerate()
            .map(|(i, cmd)| format!("  {}. {cmd}", i + 1))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// zsh extended history lines look like `: 1700000000:0;command`.
fn strip_zsh_extended_format(line: &str) -> &str {
    if line.starts_with(": ") {
        if let Some(pos) = line.find(';') {
            return &line[pos + 1..];
        }
    }
    line
}
