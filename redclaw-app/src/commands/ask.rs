use crate::config::Config;
use crate::{EXIT_BACKEND, EXIT_OK, EXIT_USAGE};
use anyhow::Result;
use redclaw_policy::{PolicyEngine, Subject};
use redclaw_providers::{create_backend, CompletionRequest, Mode};

pub async fn run(config: &Config, args: &[String]) -> Result<i32> {
    let question = args.join(" ");
    if question.trim().is_empty() {
        eprintln!("❌ Question is required");
        eprintln!("Usage: redclaw ask <your question>");
        return Ok(EXIT_USAGE);
    }

    let policy = PolicyEngine::new(config.policy_config());
    let decision = policy.evaluate(&Subject::prompt(&question));
    if decision.requires_banner {
        if let Some(banner) = policy.legal_banner() {
            println!("{banner}\n");
        }
    }
    for reason in &decision.reasons {
        println!("⚠️  {reason}");
    }

    let backend = match create_backend(config.backend_config()?) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("❌ Backend error: {e}");
            return Ok(EXIT_BACKEND);
        }
    };

    println!("Asking: {question}\n");
    match backend
        .complete(&CompletionRequest::new(Mode::Ask, question))
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
