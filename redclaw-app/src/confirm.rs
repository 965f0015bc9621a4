use async_trait::async_trait;
use redclaw_executor::{Confirm, ConfirmRequest};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive confirmation over stdin.
///
/// Ctrl-C or EOF during the wait resolves to a decline, so the executor
/// still writes its audit record before the process winds down.
pub struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm_run(&self, request: &ConfirmRequest<'_>) -> bool {
        println!();
        println!("Command:   {}", request.displayed_command);
        println!("Tool:      {}", request.tool);
        if let Some(rationale) = request.rationale {
            println!("Rationale: {rationale}");
        }
        prompt_yes_no("Execute this command? [y/N] ").await
    }

    async fn acknowledge_warnings(
        &self,
        request: &ConfirmRequest<'_>,
        reasons: &[String],
    ) -> bool {
        println!();
        println!("⚠️  Policy warnings for `{}`:", request.displayed_command);
        for reason in reasons {
            println!("   - {reason}");
        }
        prompt_yes_no("Proceed despite the warnings? [y/N] ").await
    }
}

async fn prompt_yes_no(prompt: &str) -> bool {
    print!("{prompt}");
    let _ = std::io::stdout().flush();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!();
            false
        }
        line = read_line() => {
            matches!(line.as_deref().map(str::trim), Some(answer)
                if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
        }
    }
}

async fn read_line() -> Option<String> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(_) => None,
    }
}
