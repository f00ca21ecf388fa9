//! Ollama structured-output provider
//!
//! Uses `/api/chat` with the JSON schema passed as `format`, which constrains decoding
//! so the message content is a JSON document matching the schema.

use super::{check_status, map_send_error};
use async_trait::async_trait;
use athena_core::{InferenceError, InferenceProvider, InferenceResult, StructuredRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, trace};

/// Ollama chat provider with schema-constrained output
pub struct OllamaStructuredProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OllamaStructuredProvider {
    /// Create a new Ollama provider
    pub fn new(base_url: String, model: String, temperature: f32, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn build_body(&self, request: &StructuredRequest) -> Value {
        // Ollama has no function name/description slot, so the description rides
        // along as an extra system message
        let mut messages = vec![json!({
            "role": "system",
            "content": format!(
                "Answer with a single JSON object for `{}`: {}",
                request.schema_name, request.schema_description
            ),
        })];
        messages.extend(request.messages.iter().map(|m| {
            json!({
                "role": m.role.as_str(),
                "content": m.content,
            })
        }));

        json!({
            "model": self.model,
            "messages": messages,
            "format": request.schema,
            "stream": false,
            "options": {
                "temperature": request.temperature.unwrap_or(self.temperature),
            },
        })
    }
}

#[async_trait]
impl InferenceProvider for OllamaStructuredProvider {
    async fn generate_structured(&self, request: StructuredRequest) -> InferenceResult<Value> {
        let timeout = request.timeout.unwrap_or(self.timeout);
        let body = self.build_body(&request);
        let url = format!("{}/api/chat", self.base_url);

        debug!(provider = "ollama", model = %self.model, "Sending schema-constrained chat");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout))?;

        let response = check_status(response).await?;

        let parsed: OllamaResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                map_send_error(e, timeout)
            } else {
                InferenceError::InvalidResponse(format!("Failed to parse response: {e}"))
            }
        })?;

        let content = parsed.message.content;
        trace!(content = %content, "Raw model output");

        if content.trim().is_empty() {
            return Err(InferenceError::InvalidResponse(
                "model returned empty content".to_string(),
            ));
        }

        serde_json::from_str(&content).map_err(|e| {
            InferenceError::MalformedOutput(format!("message content is not JSON: {e}"))
        })
    }

    fn provider_name(&self) -> &str {
        "Ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Ollama API response types
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}
