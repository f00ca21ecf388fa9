//! Mock inference provider for testing
//!
//! Lets extraction and assembly be tested without API keys or network calls.
//! Responses are scripted by a substring of the request's user messages, so a test
//! can give each chunk its own answer, failure, or delay regardless of call order.

use async_trait::async_trait;
use athena_core::{InferenceError, InferenceProvider, InferenceResult, StructuredRequest};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Clone)]
enum Scripted {
    Respond(Value),
    Fail(InferenceError),
}

#[derive(Clone)]
struct Rule {
    needle: String,
    outcome: Scripted,
    delay: Option<Duration>,
}

/// Record of a mock provider call
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Schema name the request was made for
    pub schema_name: String,
    /// All message contents, in order
    pub messages: Vec<String>,
    /// Temperature override carried by the request
    pub temperature: Option<f32>,
}

/// Mock structured-output provider
///
/// Unmatched requests get the default response, an empty graph unless changed.
pub struct MockInferenceProvider {
    model_name: String,
    rules: Arc<Mutex<Vec<Rule>>>,
    default_response: Arc<Mutex<Value>>,
    call_history: Arc<Mutex<Vec<MockCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MockInferenceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInferenceProvider {
    pub fn new() -> Self {
        Self {
            model_name: "mock-llm".to_string(),
            rules: Arc::new(Mutex::new(Vec::new())),
            default_response: Arc::new(Mutex::new(serde_json::json!({"nodes": [], "rels": []}))),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider with a custom model name
    pub fn with_model(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::new()
        }
    }

    /// Answer with `response` when any user message contains `needle`
    ///
    /// Rules are checked in insertion order; the first match wins.
    pub fn respond_when(&self, needle: &str, response: Value) {
        self.push_rule(needle, Scripted::Respond(response), None);
    }

    /// Fail with `error` when any user message contains `needle`
    pub fn fail_when(&self, needle: &str, error: InferenceError) {
        self.push_rule(needle, Scripted::Fail(error), None);
    }

    /// Like [`respond_when`](Self::respond_when), after sleeping for `delay`
    pub fn respond_after(&self, needle: &str, response: Value, delay: Duration) {
        self.push_rule(needle, Scripted::Respond(response), Some(delay));
    }

    pub fn set_default_response(&self, response: Value) {
        *lock(&self.default_response) = response;
    }

    /// Get the call history for verification
    pub fn call_history(&self) -> Vec<MockCall> {
        lock(&self.call_history).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.call_history).len()
    }

    pub fn clear_history(&self) {
        lock(&self.call_history).clear();
    }

    fn push_rule(&self, needle: &str, outcome: Scripted, delay: Option<Duration>) {
        lock(&self.rules).push(Rule {
            needle: needle.to_string(),
            outcome,
            delay,
        });
    }

    fn matching_rule(&self, request: &StructuredRequest) -> Option<Rule> {
        let rules = lock(&self.rules);
        rules
            .iter()
            .find(|rule| {
                request
                    .messages
                    .iter()
                    .filter(|m| m.role == athena_core::PromptRole::User)
                    .any(|m| m.content.contains(&rule.needle))
            })
            .cloned()
    }
}

#[async_trait]
impl InferenceProvider for MockInferenceProvider {
    async fn generate_structured(&self, request: StructuredRequest) -> InferenceResult<Value> {
        lock(&self.call_history).push(MockCall {
            schema_name: request.schema_name.clone(),
            messages: request.messages.iter().map(|m| m.content.clone()).collect(),
            temperature: request.temperature,
        });

        let Some(rule) = self.matching_rule(&request) else {
            return Ok(lock(&self.default_response).clone());
        };

        if let Some(delay) = rule.delay {
            tokio::time::sleep(delay).await;
        }

        match rule.outcome {
            Scripted::Respond(value) => Ok(value),
            Scripted::Fail(error) => Err(error),
        }
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        &self.model_name
    }
}
