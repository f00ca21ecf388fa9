//! Structured-output LLM configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default model for graph extraction
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";

/// Default sampling temperature; extraction runs deterministic
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Default API timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Models known to produce usable graphs with the forced function call
pub const MODEL_PRESETS: &[&str] = &[
    "gpt-3.5-turbo-1106",
    "gpt-4-1106-preview",
    "gpt-3.5-turbo-16k",
    "gpt-4",
];

/// Inference backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// OpenAI-compatible chat completions with function calling
    #[default]
    #[serde(alias = "open_ai")]
    OpenAI,
    /// Local Ollama server with JSON-schema constrained output
    Ollama,
}

impl LlmProviderType {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

impl fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// LLM provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderType,
    #[serde(default = "default_model")]
    pub model: String,
    /// Endpoint URL; the provider default is used when absent
    pub endpoint: Option<String>,
    /// Sampling temperature (0.0-2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// API timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the environment variable that holds the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderType::default(),
            model: default_model(),
            endpoint: None,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key_env: default_api_key_env(),
        }
    }
}

impl LlmConfig {
    /// Config for one of the preset models, at temperature 0
    pub fn preset(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Get the endpoint, using the provider default if not specified
    pub fn llm_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| self.provider.default_endpoint().to_string())
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_preset_model(&self) -> bool {
        MODEL_PRESETS.contains(&self.model.as_str())
    }

    pub fn with_provider(mut self, provider: LlmProviderType) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.provider, LlmProviderType::OpenAI);
        assert_eq!(config.model, "gpt-3.5-turbo-1106");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.llm_endpoint(), "https://api.openai.com/v1");
        assert!(config.is_preset_model());
    }

    #[test]
    fn test_ollama_endpoint_default() {
        let config = LlmConfig::default().with_provider(LlmProviderType::Ollama);
        assert_eq!(config.llm_endpoint(), "http://localhost:11434");
        assert!(!config.provider.requires_api_key());
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            provider = "ollama"
            model = "llama3.1"
        "#;
        let config: LlmConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.provider, LlmProviderType::Ollama);
        assert_eq!(config.model, "llama3.1");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_api_key_from_unset_env() {
        let config = LlmConfig {
            api_key_env: "ATHENA_TEST_SURELY_UNSET_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_presets() {
        for model in MODEL_PRESETS {
            let config = LlmConfig::preset(*model);
            assert!(config.is_preset_model());
            assert_eq!(config.temperature, 0.0);
        }
    }
}
