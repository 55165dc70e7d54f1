//! Provider selection for HTTP-backed models.
//!
//! The host describes which providers it can reach in a small JSON file;
//! API keys missing from the file are taken from the environment. The
//! config is read-only input to `HttpModel` construction.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::types::Provider;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Order tried when no provider is pinned.
const AUTO_ORDER: [Provider; 3] = [Provider::Anthropic, Provider::Groq, Provider::OpenAI];

/// Credentials and model names for the providers the host may use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider name to pin, or unset/"auto" to take the first provider
    /// with a usable key.
    pub preferred_provider: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub anthropic_model: Option<String>,
    pub groq_model: Option<String>,
}

impl ModelConfig {
    /// Read a config file. A missing or malformed file yields an empty
    /// config; env keys still apply.
    pub fn from_file(path: &Path) -> Self {
        let config: ModelConfig = std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        debug!("Loaded model config from {}", path.display());
        config.with_env_keys()
    }

    /// Fill keys the file did not set from the conventional env vars.
    pub fn with_env_keys(mut self) -> Self {
        for provider in Provider::ALL {
            let slot = self.key_slot(provider);
            if slot.is_none() {
                *slot = std::env::var(provider.env_key()).ok();
            }
        }
        self
    }

    /// Pick the provider, model name, and API key to use, or `None` when
    /// no usable provider exists.
    pub fn resolve_provider(&self) -> Option<(Provider, String, String)> {
        match self.preferred_provider.as_deref() {
            None | Some("auto") => AUTO_ORDER.iter().find_map(|&p| self.candidate(p)),
            Some(name) => Provider::from_name(name).and_then(|p| self.candidate(p)),
        }
    }

    fn candidate(&self, provider: Provider) -> Option<(Provider, String, String)> {
        let key = match provider {
            Provider::OpenAI => self.openai_api_key.as_ref()?,
            Provider::Anthropic => self.anthropic_api_key.as_ref()?,
            Provider::Groq => self.groq_api_key.as_ref()?,
        };
        Some((provider, self.model_name(provider), key.clone()))
    }

    fn model_name(&self, provider: Provider) -> String {
        let (configured, default) = match provider {
            Provider::OpenAI => (&self.openai_model, DEFAULT_OPENAI_MODEL),
            Provider::Anthropic => (&self.anthropic_model, DEFAULT_ANTHROPIC_MODEL),
            Provider::Groq => (&self.groq_model, DEFAULT_GROQ_MODEL),
        };
        configured.clone().unwrap_or_else(|| default.into())
    }

    fn key_slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::OpenAI => &mut self.openai_api_key,
            Provider::Anthropic => &mut self.anthropic_api_key,
            Provider::Groq => &mut self.groq_api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_resolves_nothing() {
        assert!(ModelConfig::default().resolve_provider().is_none());
    }

    #[test]
    fn test_pinned_provider_wins_over_auto_order() {
        let config = ModelConfig {
            preferred_provider: Some("openai".into()),
            openai_api_key: Some("sk-test".into()),
            anthropic_api_key: Some("ak-test".into()),
            ..Default::default()
        };
        let (provider, model, key) = config.resolve_provider().unwrap();
        assert_eq!(provider, Provider::OpenAI);
        assert_eq!(model, DEFAULT_OPENAI_MODEL);
        assert_eq!(key, "sk-test");
    }

    #[test]
    fn test_pinned_provider_without_key_resolves_nothing() {
        let config = ModelConfig {
            preferred_provider: Some("groq".into()),
            openai_api_key: Some("sk-test".into()),
            ..Default::default()
        };
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_unknown_provider_name_resolves_nothing() {
        let config = ModelConfig {
            preferred_provider: Some("mistral".into()),
            openai_api_key: Some("sk-test".into()),
            ..Default::default()
        };
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_auto_order() {
        let config = ModelConfig {
            openai_api_key: Some("sk-test".into()),
            groq_api_key: Some("gk-test".into()),
            ..Default::default()
        };
        let (provider, model, _) = config.resolve_provider().unwrap();
        assert_eq!(provider, Provider::Groq);
        assert_eq!(model, DEFAULT_GROQ_MODEL);
    }

    #[test]
    fn test_configured_model_name_overrides_default() {
        let config = ModelConfig {
            anthropic_api_key: Some("ak-test".into()),
            anthropic_model: Some("claude-opus-4-20250514".into()),
            ..Default::default()
        };
        let (_, model, _) = config.resolve_provider().unwrap();
        assert_eq!(model, "claude-opus-4-20250514");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model-config.json");
        std::fs::write(
            &path,
            r#"{"preferred_provider": "groq", "groq_api_key": "gk-test"}"#,
        )
        .unwrap();

        let config = ModelConfig::from_file(&path);
        assert_eq!(config.preferred_provider.as_deref(), Some("groq"));
        assert_eq!(config.groq_api_key.as_deref(), Some("gk-test"));
        // Unset fields stay defaulted
        assert!(config.groq_model.is_none());
    }

    #[test]
    fn test_from_missing_file_is_empty() {
        let config = ModelConfig::from_file(Path::new("/nonexistent/model-config.json"));
        assert!(config.preferred_provider.is_none());
    }
}
