//! External provider implementations of `LanguageModel`.
//!
//! OpenAI and Groq share the chat-completions format. Anthropic uses the
//! Messages API. All calls are blocking, single round-trip, no streaming:
//! the pipeline consumes whole responses (score lists, JSON arrays), not
//! tokens.

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

use flowrank_core::{Error, Result};

use crate::config::ModelConfig;
use crate::model::LanguageModel;
use crate::types::Provider;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

const DEFAULT_MAX_TOKENS: usize = 2048;

/// Blocking HTTP-backed language model.
pub struct HttpModel {
    client: Client,
    provider: Provider,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: usize,
}

impl HttpModel {
    pub fn new(provider: Provider, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            provider,
            model: model.into(),
            api_key: api_key.into(),
            temperature: 0.0,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a model from the resolved provider configuration.
    pub fn from_config(config: &ModelConfig) -> Option<Self> {
        let (provider, model, api_key) = config.resolve_provider()?;
        Some(Self::new(provider, model, api_key))
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    fn generate_openai_compat(&self, url: &str, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        debug!("Calling {} with model {}", url, self.model);

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| Error::Http(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Http(format!("API error {status}: {body}")));
        }

        let parsed: Value = response
            .json()
            .map_err(|e| Error::Http(format!("invalid response body: {e}")))?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Model("response has no message content".into()))
    }

    fn generate_anthropic(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        debug!("Calling Anthropic with model {}", self.model);

        let response = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| Error::Http(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Http(format!("API error {status}: {body}")));
        }

        let parsed: Value = response
            .json()
            .map_err(|e| Error::Http(format!("invalid response body: {e}")))?;

        parsed["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Model("response has no text content".into()))
    }
}

impl LanguageModel for HttpModel {
    fn generate(&self, prompt: &str) -> Result<String> {
        match self.provider {
            Provider::OpenAI => self.generate_openai_compat(OPENAI_URL, prompt),
            Provider::Groq => self.generate_openai_compat(GROQ_URL, prompt),
            Provider::Anthropic => self.generate_anthropic(prompt),
        }
    }
}
