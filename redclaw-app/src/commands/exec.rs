use crate::commands::run::{execute_target, parse_run_flags};
use crate::config::Config;
use crate::EXIT_USAGE;
use anyhow::Result;
use redclaw_executor::RunTarget;

/// Run an ad hoc command through the same confirmation pipeline as a
/// cached suggestion. The audit record carries no suggestion id.
pub async fn run(config: &Config, args: &[String]) -> Result<i32> {
    let (words, opts) = match parse_run_flags(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("❌ {message}");
            eprintln!("Usage: redclaw exec <command…> [--yes] [--note <text>] [--important]");
            return Ok(EXIT_USAGE);
        }
    };
    if words.is_empty() {
        eprintln!("❌ A command is required");
        eprintln!("Usage: redclaw exec <command…> [--yes] [--note <text>] [--important]");
        return Ok(EXIT_USAGE);
    }

    let target = RunTarget::AdHoc {
        command: words.join(" "),
    };
    execute_target(config, target, opts).await
}
