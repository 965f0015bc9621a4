use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl BackendError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::Transport(e.to_string())
        }
    }

    /// A retry suggestion for transient failures, surfaced to the user
    /// instead of being swallowed.
    pub fn retry_hint(&self) -> Option<&'static str> {
        match self {
            BackendError::Timeout => {
                Some("the backend took too long; retry, or raise backend.timeout_seconds")
            }
            BackendError::Transport(_) => {
                Some("check that the backend is reachable, then retry")
            }
            _ => None,
        }
    }
}

/// What the caller wants from the model. Each mode carries its own system
/// prompt so providers stay interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ask,
    Explain,
    Suggest,
}

impl Mode {
    pub fn system_prompt(self) -> &'static str {
        match self {
            Mode::Ask => {
                "You are REDCLAW, an offensive-security assistant for authorized \
                 engagements on Kali-style systems.\n\
                 Respond with direct, copy-pasteable Linux commands and short, \
                 practical explanations. Use realistic examples, not placeholders."
            }
            Mode::Explain => {
                "You are REDCLAW, an offensive-security assistant for authorized \
                 engagements on Kali-style systems.\n\
                 For the given command or output, explain what it does, what each \
                 flag means, the risks involved, and safer alternatives where they \
                 exist. Keep it short and practical."
            }
            Mode::Suggest => {
                "You are REDCLAW, an offensive-security assistant for authorized \
                 engagements on Kali-style systems.\n\
                 Generate 2-4 direct, copy-pasteable Linux commands for the given \
                 task. Use realistic examples, not placeholders, and prefer tools \
                 that are installed.\n\
                 Respond with ONLY a JSON array in this shape:\n\
                 [{\"tool\": \"nmap\", \"command\": \"nmap -sCV -p 22,80 10.0.0.5\", \
                 \"description\": \"service and version scan\"}]"
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub mode: Mode,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(mode: Mode, prompt: impl Into<String>) -> Self {
        Self {
            mode,
            prompt: prompt.into(),
        }
    }
}

/// The one capability the pipeline needs from a language model.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;

    fn name(&self) -> &str;
}
