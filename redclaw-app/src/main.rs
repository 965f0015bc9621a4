use redclaw_app::EXIT_FAILURE;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = match redclaw_app::run(&args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}
