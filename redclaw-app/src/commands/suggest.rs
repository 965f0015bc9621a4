use crate::config::Config;
use crate::history;
use crate::{EXIT_BACKEND, EXIT_OK, EXIT_USAGE};
use anyhow::Result;
use redclaw_core::SuggestionDraft;
use redclaw_policy::{PolicyEngine, Subject};
use redclaw_plugins::PluginLibrary;
use redclaw_providers::{create_backend, extract_suggestions, CompletionRequest, Mode};
use redclaw_store::SuggestionStore;

const HISTORY_CONTEXT_LINES: usize = 5;

pub async fn run(config: &Config, args: &[String]) -> Result<i32> {
    let (task_words, tool_filter) = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("❌ {message}");
            eprintln!("Usage: redclaw suggest <task…> [--tool <name>]");
            return Ok(EXIT_USAGE);
        }
    };
    if task_words.is_empty() {
        eprintln!("❌ Task description is required");
        eprintln!("Usage: redclaw suggest <task…> [--tool <name>]");
        return Ok(EXIT_USAGE);
    }
    let task = task_words.join(" ");

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
    let plugins = PluginLibrary::load(Config::plugins_dir()?)?;

    let prompt = build_prompt(&task, tool_filter.as_deref(), &plugins, config);

    println!("Task: {task}");
    println!("Generating suggestions…");
    let response = match backend
        .complete(&CompletionRequest::new(Mode::Suggest, prompt))
        .await
    {
        Ok(response) => response,
        Err(e) => {
            eprintln!("❌ Backend error: {e}");
            if let Some(hint) = e.retry_hint() {
                eprintln!("   {hint}");
            }
            return Ok(EXIT_BACKEND);
        }
    };

    let proposed = match extract_suggestions(&response) {
        Ok(proposed) => proposed,
        Err(_) => {
            // Not fatal: show what the model said and let the user retry.
            println!("\nCould not parse structured suggestions. Raw response:\n");
            println!("{response}");
            return Ok(EXIT_OK);
        }
    };

    let drafts: Vec<SuggestionDraft> = proposed
        .into_iter()
        .map(|p| {
            let decision =
                policy.evaluate(&Subject::command_for_tool(&p.command, &p.tool));
            SuggestionDraft {
                tool: p.tool,
                command_text: p.command,
                rationale: p.description,
                risk_level: decision.risk_level(),
            }
        })
        .collect();

    let store = SuggestionStore::new(Config::data_dir()?, config.run.suggestion_ttl_minutes)?;
    let batch = store.put_batch(drafts)?;

    if batch.is_empty() {
        println!("\nThe backend proposed no commands for this task.");
        return Ok(EXIT_OK);
    }

    println!("\n{:<4} {:<8} {:<12} COMMAND", "ID", "RISK", "TOOL");
    for suggestion in &batch.suggestions {
        println!(
            "{:<4} {:<8} {:<12} {}",
            suggestion.id,
            suggestion.risk_level.as_str(),
            suggestion.tool,
            policy.display_text(&suggestion.command_text),
        );
        if !suggestion.rationale.is_empty() {
            println!("{:<26} ↳ {}", "", suggestion.rationale);
        }
    }
    println!("\nTo execute a suggestion: redclaw run <ID>");

    Ok(EXIT_OK)
}

fn parse_args(args: &[String]) -> std::result::Result<(Vec<String>, Option<String>), String> {
    let mut task_words = Vec::new();
    let mut tool = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--tool" {
            tool = Some(
                iter.next()
                    .ok_or_else(|| "--tool requires a value".to_string())?
                    .clone(),
            );
        } else if let Some(value) = arg.strip_prefix("--tool=") {
            tool = Some(value.to_string());
        } else if arg.starts_with('-') {
            return Err(format!("unknown option: {arg}"));
        } else {
            task_words.push(arg.clone());
        }
    }
    Ok((task_words, tool))
}

fn build_prompt(
    task: &str,
    tool_filter: Option<&str>,
    plugins: &PluginLibrary,
    config: &Config,
) -> String {
    let mut prompt = format!("Task: {task}\n\n");

    if !plugins.is_empty() {
        prompt.push_str(&format!(
            "Tools with local knowledge available: {}\n\n",
            plugins.tool_names().join(", ")
        ));
    }

    let history_lines = HISTORY_CONTEXT_LINES.min(config.core.history_lines);
    if let Some(context) = history::context_block(history_lines) {
        prompt.push_str(&format!("Recent commands for context:\n{context}\n\n"));
    }
    if let Some(last) = history::last_command() {
        prompt.push_str(&format!("Last typed command: {last}\n\n"));
    }

    if let Some(tool) = tool_filter {
        let examples = plugins.examples(tool);
        if !examples.is_empty() {
            prompt.push_str(&format!("Known {tool} examples:\n"));
            for example in examples.iter().take(3) {
                prompt.push_str(&format!("- {}: {}\n", example.cmd, example.desc));
            }
            prompt.push('\n');
        }
        prompt.push_str(&format!("Prefer the {tool} tool where it fits.\n"));
    }

    prompt.push_str("Suggest 2-4 safe commands for this task.");
    prompt
}
