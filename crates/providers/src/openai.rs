use crate::traits::{Backend, BackendError, CompletionRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, BackendError> {
        if api_key.is_empty() {
            return Err(BackendError::Configuration(
                "OpenAI API key not set; export it via the configured key env var".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
        })
    }

    /// Point the backend at a non-default endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.mode.system_prompt()},
                {"role": "user", "content": request.prompt},
            ],
            "temperature": 0.7,
            "max_tokens": 2000,
        });

        tracing::debug!(model = %self.model, "openai completion request");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::Api(format!("{status}: {text}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        payload["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| BackendError::Parse("no choices in response".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
