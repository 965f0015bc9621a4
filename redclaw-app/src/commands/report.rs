use crate::config::Config;
use crate::{EXIT_IO, EXIT_NOT_FOUND, EXIT_OK, EXIT_USAGE};
use anyhow::Result;
use redclaw_audit::AuditLogger;
use redclaw_core::resolve_session_arg;
use redclaw_report::{ReportBuilder, ReportError};
use std::path::PathBuf;

pub async fn run(_config: &Config, args: &[String]) -> Result<i32> {
    let (date_arg, output) = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("❌ {message}");
            eprintln!("Usage: redclaw report [date|today] [-o <path>]");
            return Ok(EXIT_USAGE);
        }
    };

    let Some(session_id) = resolve_session_arg(&date_arg) else {
        eprintln!("❌ Invalid date '{date_arg}' — expected YYYY-MM-DD or 'today'");
        return Ok(EXIT_USAGE);
    };

    let audit = AuditLogger::new(Config::log_dir()?)?;
    let builder = ReportBuilder::new(&audit);
    let document = match builder.build(&session_id) {
        Ok(document) => document,
        Err(ReportError::NotFound(session)) => {
            eprintln!("❌ No activity logged for {session}");
            return Ok(EXIT_NOT_FOUND);
        }
        Err(e) => return Err(e.into()),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            if let Err(e) = std::fs::write(&path, &document) {
                eprintln!("❌ Failed to write {}: {e}", path.display());
                return Ok(EXIT_IO);
            }
            println!("✓ Report saved to {}", path.display());
        }
        None => println!("{document}"),
    }
    Ok(EXIT_OK)
}

fn parse_args(args: &[String]) -> std::result::Result<(String, Option<PathBuf>), String> {
    let mut date = "today".to_string();
    let mut output = None;
    let mut seen_date = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                output = Some(PathBuf::from(
                    iter.next()
                        .ok_or_else(|| format!("{arg} requires a path"))?,
                ));
            }
            _ if arg.starts_with('-') => return Err(format!("unknown option: {arg}")),
            _ if !seen_date => {
                date = arg.clone();
                seen_date = true;
            }
            _ => return Err("only one date argument is accepted".to_string()),
        }
    }
    Ok((date, output))
}
