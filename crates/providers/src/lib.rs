//! Language-model backend adapters.
//!
//! The pipeline only ever sees the [`Backend`] trait: one operation,
//! `complete`, taking a mode-tagged prompt. Which provider answers is a
//! configuration choice resolved once by [`create_backend`]; nothing
//! downstream depends on it.

pub mod ollama;
pub mod openai;
pub mod parse;
pub mod traits;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use parse::{extract_suggestions, SuggestedCommand};
pub use traits::{Backend, BackendError, CompletionRequest, Mode};

use std::time::Duration;

/// Provider selection, built from configuration at process start.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    OpenAi {
        api_key: String,
        model: String,
        timeout: Duration,
    },
    Ollama {
        host: String,
        model: String,
        timeout: Duration,
    },
}

/// Strategy selection: one trait, independent implementations, no
/// inheritance hierarchy.
pub fn create_backend(config: BackendConfig) -> Result<Box<dyn Backend>, BackendError> {
    match config {
        BackendConfig::OpenAi {
            api_key,
            model,
            timeout,
        } => Ok(Box::new(OpenAiBackend::new(api_key, model, timeout)?)),
        BackendConfig::Ollama {
            host,
            model,
            timeout,
        } => Ok(Box::new(OllamaBackend::new(host, model, timeout)?)),
    }
}
