//! Inference capability boundary
//!
//! An [`InferenceProvider`] takes a JSON schema plus prompt messages and returns a
//! single JSON value the model claims conforms to that schema. Validating the claim
//! is the caller's job ([`KnowledgeGraph::from_value`](crate::KnowledgeGraph::from_value)).
//!
//! Providers are constructed with their model identifier and determinism settings;
//! there are no process-wide client singletons.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Who a prompt message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
}

impl PromptRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One message of the model-facing prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

/// A request for schema-constrained output
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// Name the schema is offered under (function name for function-calling APIs)
    pub schema_name: String,

    /// Short description of what the schema represents
    pub schema_description: String,

    /// JSON schema the answer must conform to
    pub schema: serde_json::Value,

    /// Instruction and input messages, in order
    pub messages: Vec<PromptMessage>,

    /// Sampling temperature override; providers fall back to their configured value
    pub temperature: Option<f32>,

    /// Deadline for the round trip; providers fall back to their configured value
    pub timeout: Option<Duration>,
}

impl StructuredRequest {
    pub fn new(
        schema_name: impl Into<String>,
        schema_description: impl Into<String>,
        schema: serde_json::Value,
        messages: Vec<PromptMessage>,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema_description: schema_description.into(),
            schema,
            messages,
            temperature: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Content of the last user message, if any
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == PromptRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Errors raised by inference providers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// Transport-level failure (DNS, connection refused, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The API answered, but not with a usable structured payload
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The model answered, but its structured payload is not valid JSON
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    /// Provider is misconfigured (missing key, unknown model)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The round trip exceeded its deadline
    #[error("Request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

/// Result type for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;

impl InferenceError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) | Self::MalformedOutput(_) | Self::Config(_) => false,
        }
    }
}

/// A language model that can answer with schema-constrained JSON
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Perform exactly one round trip and return the structured answer
    ///
    /// Implementations must not retry internally.
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> InferenceResult<serde_json::Value>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_user_message() {
        let request = StructuredRequest::new(
            "KnowledgeGraph",
            "desc",
            serde_json::json!({}),
            vec![
                PromptMessage::system("rules"),
                PromptMessage::user("input"),
                PromptMessage::user("tip"),
            ],
        );

        assert_eq!(request.last_user_message(), Some("tip"));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(InferenceError::Api {
            status: 429,
            body: String::new()
        }
        .is_retryable());
        assert!(InferenceError::Api {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!InferenceError::Api {
            status: 401,
            body: String::new()
        }
        .is_retryable());
        assert!(!InferenceError::InvalidResponse("no tool call".to_string()).is_retryable());
    }
}
