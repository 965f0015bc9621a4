use crate::config::Config;
use crate::{EXIT_BACKEND, EXIT_OK, EXIT_USAGE};
use anyhow::Result;
use redclaw_policy::PolicyEngine;
use redclaw_providers::{create_backend, CompletionRequest, Mode};
use std::path::PathBuf;

pub async fn run(config: &Config, args: &[String]) -> Result<i32> {
    let (words, file) = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("❌ {message}");
            eprintln!("Usage: redclaw explain <command…> | -f <file>");
            return Ok(EXIT_USAGE);
        }
    };

    let content = if let Some(path) = file {
        match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("❌ Could not read {}: {e}", path.display());
                return Ok(EXIT_USAGE);
            }
        }
    } else if !words.is_empty() {
        words.join(" ")
    } else {
        eprintln!("❌ Provide either a command or --file");
        eprintln!("Usage: redclaw explain <command…> | -f <file>");
        return Ok(EXIT_USAGE);
    };

    let policy = PolicyEngine::new(config.policy_config());
    if let Some(banner) = policy.legal_banner() {
        println!("{banner}\n");
    }

    let backend = match create_backend(config.backend_config()?) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("❌ Backend error: {e}");
            return Ok(EXIT_BACKEND);
        }
    };

    let preview: String = content.chars().take(100).collect();
    println!("Explaining: {preview}…\n");

    let prompt = format!("Explain this command/output in detail:\n\n{content}");
    match backend
        .complete(&CompletionRequest::new(Mode::Explain, prompt))
        .await
    {
        Ok(response) => {
            println!("{response}");
            Ok(EXIT_OK)
        }
        Err(e) => {
            eprintln!("❌ Backend error: {e}");
            if let Some(hint) = e.retry_hint() {
                eprintln!("   {hint}");
            }
            Ok(EXIT_BACKEND)
        }
    }
}

fn parse_args(args: &[String]) -> std::result::Result<(Vec<String>, Option<PathBuf>), String> {
    let mut words = Vec::new();
    let mut file = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-f" | "--file" => {
                file = Some(PathBuf::from(
                    iter.next()
                        .ok_or_else(|| format!("{arg} requires a path"))?,
                ));
            }
            _ => words.push(arg.clone()),
        }
    }
    Ok((words, file))
}
