use crate::traits::{Backend, BackendError, CompletionRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

#[derive(Debug)]
pub struct OllamaBackend {
    client: Client,
    host: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(host: String, model: String, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        // Ollama's generate endpoint takes a single prompt string.
        let body = json!({
            "model": self.model,
            "prompt": format!("{}\n\n{}", request.mode.system_prompt(), request.prompt),
            "stream": false,
        });

        tracing::debug!(model = %self.model, host = %self.host, "ollama completion request");
        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BackendError::Transport(format!(
                        "could not connect to Ollama at {}; make sure it is running: 'ollama serve'",
                        self.host
                    ))
                } else {
                    BackendError::from_reqwest(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::Api(format!("{status}: {text}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        Ok(payload
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
