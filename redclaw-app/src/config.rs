use anyhow::{Context, Result};
use redclaw_executor::ExecutorOptions;
use redclaw_policy::PolicyConfig;
use redclaw_providers::BackendConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Process-wide configuration, loaded once from
/// `~/.redclaw/config.toml` and passed to component constructors.
/// A missing file means defaults; a malformed file is an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub core: CoreSection,
    pub backend: BackendSection,
    pub policy: PolicySection,
    pub run: RunSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSection {
    pub legal_banner: bool,
    pub history_lines: usize,
    pub log_level: String,
}

impl Default for CoreSection {
    fn default() -> Self {
        Self {
            legal_banner: true,
            history_lines: 25,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// `ollama` or `openai`.
    pub provider: String,
    /// Overrides the per-provider default model when non-empty.
    pub model: String,
    pub timeout_seconds: u64,
    pub openai: OpenAiSection,
    pub ollama: OllamaSection,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: String::new(),
            timeout_seconds: 60,
            openai: OpenAiSection::default(),
            ollama: OllamaSection::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSection {
    pub api_key_env: String,
    pub model: String,
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSection {
    pub host: String,
    pub model: String,
}

impl Default for OllamaSection {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "qwen2.5".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    pub red_team_mode: bool,
    pub anonymise_ips: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Execution ceiling in seconds; 0 disables the ceiling.
    pub timeout_seconds: u64,
    pub excerpt_chars: usize,
    pub suggestion_ttl_minutes: i64,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            timeout_seconds: 300,
            excerpt_chars: 2000,
            suggestion_ttl_minutes: 240,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::data_dir()?.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Root data directory: `$REDCLAW_HOME`, or `~/.redclaw`.
    pub fn data_dir() -> Result<PathBuf> {
        if let Some(home) = std::env::var_os("REDCLAW_HOME") {
            return Ok(PathBuf::from(home));
        }
        let home = std::env::var_os("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".redclaw"))
    }

    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("logs"))
    }

    pub fn plugins_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("plugins"))
    }

    pub fn policy_config(&self) -> PolicyConfig {
        PolicyConfig {
            red_team_mode: self.policy.red_team_mode,
            anonymise_ips: self.policy.anonymise_ips,
            show_banner: self.core.legal_banner,
        }
    }

    pub fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            command_timeout: (self.run.timeout_seconds > 0)
                .then(|| Duration::from_secs(self.run.timeout_seconds)),
            excerpt_limit: self.run.excerpt_chars,
        }
    }

    /// Resolve the configured backend, reading the API key from the
    /// configured env var for hosted providers.
    pub fn backend_config(&self) -> Result<BackendConfig> {
        let timeout = Duration::from_secs(self.backend.timeout_seconds);
        match self.backend.provider.as_str() {
            "openai" => {
                let api_key = std::env::var(&self.backend.openai.api_key_env).unwrap_or_default();
                let model = if self.backend.model.is_empty() {
                    self.backend.openai.model.clone()
                } else {
                    self.backend.model.clone()
                };
                Ok(BackendConfig::OpenAi {
                    api_key,
                    model,
                    timeout,
                })
            }
            "ollama" => {
                let model = if self.backend.model.is_empty() {
                    self.backend.ollama.model.clone()
                } else {
                    self.backend.model.clone()
                };
                Ok(BackendConfig::Ollama {
                    host: self.backend.ollama.host.clone(),
                    model,
                    timeout,
                })
            }
            other => anyhow::bail!("unknown backend provider: {other}"),
        }
    }
}
