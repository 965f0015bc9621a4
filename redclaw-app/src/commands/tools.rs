use crate::config::Config;
use crate::EXIT_OK;
use anyhow::Result;
use redclaw_plugins::PluginLibrary;

/// List plugin-known tools and whether each is installed on this system.
pub async fn run(_config: &Config) -> Result<i32> {
    let plugins = PluginLibrary::load(Config::plugins_dir()?)?;
    if plugins.is_empty() {
        println!(
            "No tool plugins found in {}",
            Config::plugins_dir()?.display()
        );
        return Ok(EXIT_OK);
    }

    println!("{:<16} {:<12} DESCRIPTION", "TOOL", "STATUS");
    for name in plugins.tool_names() {
        let status = if installed(name).await {
            "installed"
        } else {
            "missing"
        };
        let description = plugins
            .lookup(name)
            .map(|k| k.description.as_str())
            .unwrap_or_default();
        println!("{name:<16} {status:<12} {description}");
    }
    Ok(EXIT_OK)
}

async fn installed(tool: &str) -> bool {
    tokio::process::Command::new("which")
        .arg(tool)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
