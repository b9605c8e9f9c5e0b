//! Provider catalog and model selection
//!
//! Models are selected with a `provider/model` string such as
//! `openai/gpt-4.1-nano`. The provider half picks an entry from [`PROVIDERS`];
//! the model half is passed through verbatim (it may itself contain `/`, as
//! OpenRouter model ids do).

use crate::error::{Error, Result};
use crate::openai_compat::{OpenAiCompatConfig, OpenAiCompatProvider};
use std::time::Duration;

/// A known OpenAI-compatible provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Provider name used in the selector
    pub name: &'static str,
    /// Base URL of the chat-completions API
    pub base_url: &'static str,
    /// Environment variable holding the API key (empty = keyless)
    pub env_key: &'static str,
}

/// All providers Parley knows how to talk to
pub const PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        env_key: "OPENAI_API_KEY",
    },
    ProviderSpec {
        name: "groq",
        base_url: "https://api.groq.com/openai/v1",
        env_key: "GROQ_API_KEY",
    },
    ProviderSpec {
        name: "openrouter",
        base_url: "https://openrouter.ai/api/v1",
        env_key: "OPENROUTER_API_KEY",
    },
    ProviderSpec {
        name: "deepseek",
        base_url: "https://api.deepseek.com/v1",
        env_key: "DEEPSEEK_API_KEY",
    },
    ProviderSpec {
        name: "gemini",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
        env_key: "GEMINI_API_KEY",
    },
    ProviderSpec {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        env_key: "",
    },
];

impl ProviderSpec {
    /// Look up a provider by name (case-insensitive)
    #[must_use]
    pub fn find(name: &str) -> Option<&'static ProviderSpec> {
        PROVIDERS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Resolve the API key: an explicit override wins, then the provider's env var.
    #[must_use]
    pub fn resolve_api_key(&self, override_key: Option<&str>) -> String {
        if let Some(key) = override_key.filter(|k| !k.is_empty()) {
            return key.to_string();
        }
        if self.env_key.is_empty() {
            return String::new();
        }
        std::env::var(self.env_key).unwrap_or_default()
    }
}

/// A parsed `provider/model` selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    /// Catalog entry
    pub provider: &'static ProviderSpec,
    /// Model name passed to the provider
    pub model: String,
}

impl ModelSelector {
    /// Parse a `provider/model` string
    pub fn parse(selector: &str) -> Result<Self> {
        let (provider_name, model) = selector
            .split_once('/')
            .ok_or_else(|| Error::InvalidModel(selector.to_string()))?;

        if provider_name.is_empty() || model.is_empty() {
            return Err(Error::InvalidModel(selector.to_string()));
        }

        let provider = ProviderSpec::find(provider_name)
            .ok_or_else(|| Error::UnknownProvider(provider_name.to_string()))?;

        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }

    /// Build a provider client for this selector
    pub fn build_provider(
        &self,
        api_key_override: Option<&str>,
        timeout: Duration,
    ) -> Result<OpenAiCompatProvider> {
        let api_key = self.provider.resolve_api_key(api_key_override);
        let config = OpenAiCompatConfig::new(self.provider.name, self.provider.base_url, api_key)
            .with_model(&self.model)
            .with_timeout(timeout);
        OpenAiCompatProvider::new(config)
    }
}

impl std::fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider.name, self.model)
    }
}
