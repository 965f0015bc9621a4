use crate::config::Config;
use crate::confirm::StdinConfirm;
use crate::{EXIT_BLOCKED, EXIT_EXPIRED, EXIT_IO, EXIT_NOT_FOUND, EXIT_OK, EXIT_USAGE};
use anyhow::Result;
use redclaw_audit::AuditLogger;
use redclaw_core::Outcome;
use redclaw_executor::{ExecutorError, RunExecutor, RunOptions, RunReport, RunTarget};
use redclaw_policy::PolicyEngine;
use redclaw_store::{StoreError, SuggestionStore};

pub async fn run(config: &Config, args: &[String]) -> Result<i32> {
    let (id, opts) = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("❌ {message}");
            eprintln!("Usage: redclaw run <id> [--yes] [--note <text>] [--important]");
            return Ok(EXIT_USAGE);
        }
    };

    let store = SuggestionStore::new(Config::data_dir()?, config.run.suggestion_ttl_minutes)?;
    let suggestion = match store.resolve(id) {
        Ok(suggestion) => suggestion,
        Err(StoreError::NotFound(id)) => {
            eprintln!("❌ Suggestion id {id} not found — run `redclaw suggest` first");
            return Ok(EXIT_NOT_FOUND);
        }
        Err(StoreError::Expired(when)) => {
            eprintln!("❌ The suggestion batch expired at {when} — run `redclaw suggest` again");
            return Ok(EXIT_EXPIRED);
        }
        Err(e) => return Err(e.into()),
    };

    execute_target(config, RunTarget::Suggestion(suggestion), opts).await
}

/// Shared executor drive for `run` and `exec`.
pub async fn execute_target(
    config: &Config,
    target: RunTarget,
    opts: RunOptions,
) -> Result<i32> {
    let policy = PolicyEngine::new(config.policy_config());
    let audit = AuditLogger::new(Config::log_dir()?)?;
    let executor = RunExecutor::new(&policy, &audit, config.executor_options());

    let report = match executor.run(target, &StdinConfirm, opts).await {
        Ok(report) => report,
        Err(ExecutorError::Audit(e)) => {
            eprintln!("❌ Audit log unavailable, refusing to proceed: {e}");
            return Ok(EXIT_IO);
        }
    };

    print_report(&report);
    Ok(match report.outcome {
        Outcome::Blocked => EXIT_BLOCKED,
        _ => EXIT_OK,
    })
}

fn print_report(report: &RunReport) {
    match report.outcome {
        Outcome::Blocked => {
            eprintln!("\n🚫 Blocked by policy:");
            for reason in &report.reasons {
                eprintln!("   - {reason}");
            }
        }
        Outcome::Declined => {
            println!("\nCommand cancelled.");
        }
        Outcome::Executed | Outcome::Failed => {
            if !report.stdout.is_empty() {
                println!("\n{}", report.stdout.trim_end());
            }
            if !report.stderr.is_empty() {
                eprintln!("\n{}", report.stderr.trim_end());
            }
            match report.exit_code {
                Some(0) => println!("\n✓ Command executed (exit code: 0)"),
                Some(code) => println!("\n✗ Command failed (exit code: {code})"),
                None => println!("\n✗ Command failed before completion"),
            }
        }
    }
}

pub fn parse_run_flags(
    args: &[String],
) -> std::result::Result<(Vec<String>, RunOptions), String> {
    let mut positional = Vec::new();
    let mut opts = RunOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--yes" | "-y" => opts.assume_yes = true,
            "--important" => opts.important = true,
            "--note" => {
                opts.notes = Some(
                    iter.next()
                        .ok_or_else(|| "--note requires a value".to_string())?
                        .clone(),
                );
            }
            _ if arg.starts_with("--note=") => {
                opts.notes = arg.strip_prefix("--note=").map(str::to_string);
            }
            _ => positional.push(arg.clone()),
        }
    }
    Ok((positional, opts))
}

fn parse_args(args: &[String]) -> std::result::Result<(u32, RunOptions), String> {
    let (positional, opts) = parse_run_flags(args)?;
    let [id] = positional.as_slice() else {
        return Err("exactly one suggestion id is required".to_string());
    };
    let id: u32 = id
        .parse()
        .map_err(|_| format!("invalid suggestion id: {id}"))?;
    Ok((id, opts))
}
