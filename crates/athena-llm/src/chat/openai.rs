//! OpenAI structured-output provider
//!
//! Structured output is obtained through a forced function call: the schema is offered
//! as the only tool and `tool_choice` names it, so the model must answer with the
//! function's arguments. Any OpenAI-compatible endpoint that implements tool calling
//! works.

use super::{check_status, map_send_error};
use async_trait::async_trait;
use athena_core::{InferenceError, InferenceProvider, InferenceResult, StructuredRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, trace};

/// OpenAI function-calling provider
pub struct OpenAIStructuredProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAIStructuredProvider {
    /// Create a new OpenAI provider
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: String,
        temperature: f32,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            model,
            temperature,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn build_body(&self, request: &StructuredRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                })
            })
            .collect();

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature.unwrap_or(self.temperature),
            "tools": [{
                "type": "function",
                "function": {
                    "name": request.schema_name,
                    "description": request.schema_description,
                    "parameters": request.schema,
                }
            }],
            "tool_choice": {
                "type": "function",
                "function": { "name": request.schema_name }
            },
        })
    }
}

#[async_trait]
impl InferenceProvider for OpenAIStructuredProvider {
    async fn generate_structured(&self, request: StructuredRequest) -> InferenceResult<Value> {
        let timeout = request.timeout.unwrap_or(self.timeout);
        let body = self.build_body(&request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = "openai",
            model = %self.model,
            function = %request.schema_name,
            "Sending forced function call"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout))?;

        let response = check_status(response).await?;

        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| map_body_error(e, timeout))?;

        let arguments = parsed.function_arguments(&request.schema_name)?;
        trace!(arguments = %arguments, "Raw function arguments");

        serde_json::from_str(&arguments).map_err(|e| {
            InferenceError::MalformedOutput(format!("function arguments are not JSON: {e}"))
        })
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn map_body_error(err: reqwest::Error, timeout: Duration) -> InferenceError {
    if err.is_timeout() {
        map_send_error(err, timeout)
    } else {
        InferenceError::InvalidResponse(format!("Failed to parse response: {err}"))
    }
}

// OpenAI API response types
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    /// Legacy single-function answer shape
    #[serde(default)]
    function_call: Option<OpenAIFunction>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String, // JSON string
}

impl OpenAIResponse {
    fn function_arguments(self, function_name: &str) -> InferenceResult<String> {
        let message = self
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| InferenceError::InvalidResponse("No choices in response".to_string()))?;

        let mut functions = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| call.function)
            .chain(message.function_call);

        functions
            .find(|f| f.name == function_name)
            .map(|f| f.arguments)
            .ok_or_else(|| {
                InferenceError::InvalidResponse(format!(
                    "model did not call function '{function_name}'"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use athena_core::PromptMessage;

    fn request() -> StructuredRequest {
        StructuredRequest::new(
            "KnowledgeGraph",
            "A knowledge graph",
            json!({"type": "object"}),
            vec![PromptMessage::system("rules"), PromptMessage::user("text")],
        )
    }

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAIStructuredProvider::new(
            "sk-test-key".to_string(),
            Some("http://localhost:8080/v1/".to_string()),
            "gpt-4".to_string(),
            0.0,
            60,
        );

        assert_eq!(provider.provider_name(), "OpenAI");
        assert_eq!(provider.model(), "gpt-4");
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_body_forces_function() {
        let provider =
            OpenAIStructuredProvider::new("k".to_string(), None, "gpt-4".to_string(), 0.0, 60);
        let body = provider.build_body(&request());

        assert_eq!(body["tool_choice"]["function"]["name"], "KnowledgeGraph");
        assert_eq!(body["tools"][0]["function"]["parameters"]["type"], "object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "text");
        assert_eq!(body["temperature"], 0.0);
    }

    #[test]
    fn test_request_temperature_overrides() {
        let provider =
            OpenAIStructuredProvider::new("k".to_string(), None, "gpt-4".to_string(), 0.0, 60);
        let body = provider.build_body(&request().with_temperature(0.5));
        assert_eq!(body["temperature"], 0.5);
    }

    #[test]
    fn test_legacy_function_call_shape() {
        let response: OpenAIResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "function_call": {"name": "KnowledgeGraph", "arguments": "{\"nodes\":[]}"}
                }
            }]
        }))
        .unwrap();

        assert_eq!(
            response.function_arguments("KnowledgeGraph").unwrap(),
            "{\"nodes\":[]}"
        );
    }

    #[test]
    fn test_missing_function_call() {
        let response: OpenAIResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "I cannot help with that"}}]
        }))
        .unwrap();

        let err = response.function_arguments("KnowledgeGraph").unwrap_err();
        assert!(matches!(err, InferenceError::InvalidResponse(_)));
    }
}
