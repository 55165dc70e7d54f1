//! Provider types.

use serde::{Deserialize, Serialize};

/// External LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Anthropic,
    Groq,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAI, Provider::Anthropic, Provider::Groq];

    pub fn from_name(name: &str) -> Option<Provider> {
        match name {
            "openai" => Some(Provider::OpenAI),
            "anthropic" => Some(Provider::Anthropic),
            "groq" => Some(Provider::Groq),
            _ => None,
        }
    }

    /// Conventional env var carrying this provider's API key.
    pub fn env_key(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAI => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Groq => write!(f, "groq"),
        }
    }
}
