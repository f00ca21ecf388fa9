//! Structured-output provider implementations

pub mod ollama;
pub mod openai;

// Re-export providers
pub use ollama::OllamaStructuredProvider;
pub use openai::OpenAIStructuredProvider;

use athena_config::{LlmConfig, LlmProviderType};
use athena_core::{InferenceError, InferenceProvider, InferenceResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Create an inference provider from configuration
///
/// The OpenAI provider reads its key from the environment variable named by
/// `api_key_env`; a missing key is a configuration error, not a panic.
pub fn create_inference_provider(config: &LlmConfig) -> InferenceResult<Arc<dyn InferenceProvider>> {
    let provider: Arc<dyn InferenceProvider> = match config.provider {
        LlmProviderType::Ollama => Arc::new(OllamaStructuredProvider::new(
            config.llm_endpoint(),
            config.model.clone(),
            config.temperature,
            config.timeout_secs,
        )),
        LlmProviderType::OpenAI => {
            let api_key = config.api_key().ok_or_else(|| {
                InferenceError::Config(format!("{} not set", config.api_key_env))
            })?;
            Arc::new(OpenAIStructuredProvider::new(
                api_key,
                config.endpoint.clone(),
                config.model.clone(),
                config.temperature,
                config.timeout_secs,
            ))
        }
    };

    info!(
        provider = provider.provider_name(),
        model = provider.model(),
        "Created inference provider"
    );
    Ok(provider)
}

pub(crate) fn map_send_error(err: reqwest::Error, timeout: Duration) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout {
            duration_ms: timeout.as_millis() as u64,
        }
    } else {
        InferenceError::Http(err.to_string())
    }
}

pub(crate) async fn check_status(response: reqwest::Response) -> InferenceResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(InferenceError::Api {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_needs_no_key() {
        let config = LlmConfig {
            provider: LlmProviderType::Ollama,
            model: "llama3.1".to_string(),
            api_key_env: "ATHENA_TEST_UNSET_OLLAMA_KEY".to_string(),
            ..LlmConfig::default()
        };

        let provider = create_inference_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "Ollama");
        assert_eq!(provider.model(), "llama3.1");
    }

    #[test]
    fn test_openai_missing_key_is_config_error() {
        let config = LlmConfig {
            api_key_env: "ATHENA_TEST_UNSET_OPENAI_KEY".to_string(),
            ..LlmConfig::default()
        };

        let err = create_inference_provider(&config).err().unwrap();
        assert!(matches!(err, InferenceError::Config(ref msg) if msg.contains("ATHENA_TEST_UNSET_OPENAI_KEY")));
    }
}
