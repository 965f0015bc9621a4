//! redclaw — an AI command copilot for authorized security testing.
//!
//! Subcommands relevant to the pipeline: `suggest` populates the
//! suggestion store, `run`/`exec` drive the confirmation-gated executor,
//! `report` builds the Markdown session report. `ask` and `explain` are
//! plain backend conversations. Bare words are treated as a question.

pub mod commands;
pub mod config;
pub mod confirm;
pub mod history;

use config::Config;

// Distinct exit codes per failure class so scripts can tell them apart.
pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;
pub const EXIT_EXPIRED: i32 = 4;
pub const EXIT_BLOCKED: i32 = 5;
pub const EXIT_IO: i32 = 6;
pub const EXIT_BACKEND: i32 = 7;

pub async fn run(args: &[String]) -> anyhow::Result<i32> {
    if args.is_empty() {
        print_usage();
        return Ok(EXIT_OK);
    }

    let config = Config::load()?;
    init_tracing(&config.core.log_level);

    match args[0].as_str() {
        "suggest" => commands::suggest::run(&config, &args[1..]).await,
        "run" => commands::run::run(&config, &args[1..]).await,
        "exec" => commands::exec::run(&config, &args[1..]).await,
        "report" => commands::report::run(&config, &args[1..]).await,
        "ask" => commands::ask::run(&config, &args[1..]).await,
        "explain" => commands::explain::run(&config, &args[1..]).await,
        "tools" => commands::tools::run(&config).await,
        "version" | "--version" | "-V" => {
            println!("redclaw {}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_OK)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(EXIT_OK)
        }
        // Anything else is a question, same as the original quick-ask flow.
        _ => commands::ask::run(&config, args).await,
    }
}

fn init_tracing(level: &str) {
    let level = match level {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };
    // Diagnostics go to stderr; stdout stays clean for command output.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_usage() {
    println!("redclaw — AI command copilot for authorized security testing\n");
    println!("Usage:");
    println!("  redclaw suggest <task…> [--tool <name>]   propose commands for a task");
    println!("  redclaw run <id> [--yes] [--note <text>] [--important]");
    println!("                                            execute a cached suggestion");
    println!("  redclaw exec <command…>                   execute an ad hoc command");
    println!("  redclaw report [date|today] [-o <path>]   build the session report");
    println!("  redclaw ask <question…>                   ask a question");
    println!("  redclaw explain <command…> | -f <file>    explain a command or output");
    println!("  redclaw tools                             list known tools");
    println!();
    println!("  redclaw <question…>                       shorthand for `ask`");
}
