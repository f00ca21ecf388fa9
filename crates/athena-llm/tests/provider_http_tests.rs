//! HTTP contract tests for the structured-output providers
//!
//! These tests use wiremock to simulate the OpenAI and Ollama chat APIs.

use athena_core::{InferenceError, InferenceProvider, PromptMessage, StructuredRequest};
use athena_llm::{OllamaStructuredProvider, OpenAIStructuredProvider};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn graph_request() -> StructuredRequest {
    StructuredRequest::new(
        "KnowledgeGraph",
        "A knowledge graph",
        json!({"type": "object", "properties": {"nodes": {"type": "array"}}}),
        vec![
            PromptMessage::system("Extract a graph"),
            PromptMessage::user("Alice works at Acme."),
        ],
    )
}

fn openai_provider(server: &MockServer, timeout_secs: u64) -> OpenAIStructuredProvider {
    OpenAIStructuredProvider::new(
        "sk-test".to_string(),
        Some(format!("{}/v1", server.uri())),
        "gpt-3.5-turbo-1106".to_string(),
        0.0,
        timeout_secs,
    )
}

fn openai_tool_response(arguments: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-3.5-turbo-1106",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "KnowledgeGraph", "arguments": arguments}
                }]
            }
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

// ============================================================================
// OpenAI
// ============================================================================

#[tokio::test]
async fn test_openai_forced_function_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo-1106",
            "tool_choice": {"type": "function", "function": {"name": "KnowledgeGraph"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_tool_response(
            r#"{"nodes":[{"id":"alice","type":"person"}],"rels":[]}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let value = openai_provider(&server, 30)
        .generate_structured(graph_request())
        .await
        .unwrap();

    assert_eq!(value["nodes"][0]["id"], "alice");
}

#[tokio::test]
async fn test_openai_rate_limit_is_retryable_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = openai_provider(&server, 30)
        .generate_structured(graph_request())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        InferenceError::Api {
            status: 429,
            body: "slow down".to_string()
        }
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_openai_non_json_arguments_are_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_tool_response("{\"nodes\": [")),
        )
        .mount(&server)
        .await;

    let err = openai_provider(&server, 30)
        .generate_structured(graph_request())
        .await
        .unwrap_err();

    assert!(matches!(err, InferenceError::MalformedOutput(_)));
}

#[tokio::test]
async fn test_openai_timeout_is_distinct() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_tool_response("{}"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let request = graph_request().with_timeout(Duration::from_millis(200));
    let err = openai_provider(&server, 30)
        .generate_structured(request)
        .await
        .unwrap_err();

    assert_eq!(err, InferenceError::Timeout { duration_ms: 200 });
}

// ============================================================================
// Ollama
// ============================================================================

#[tokio::test]
async fn test_ollama_format_constrained_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.1",
            "stream": false,
            "format": {"type": "object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.1",
            "message": {
                "role": "assistant",
                "content": "{\"nodes\":[{\"id\":\"acme\",\"type\":\"organization\"}],\"rels\":[]}"
            },
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OllamaStructuredProvider::new(server.uri(), "llama3.1".to_string(), 0.0, 30);
    let value = provider.generate_structured(graph_request()).await.unwrap();

    assert_eq!(value["nodes"][0]["type"], "organization");
}

#[tokio::test]
async fn test_ollama_model_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error": "model 'nope' not found"}"#),
        )
        .mount(&server)
        .await;

    let provider = OllamaStructuredProvider::new(server.uri(), "nope".to_string(), 0.0, 30);
    let err = provider.generate_structured(graph_request()).await.unwrap_err();

    assert!(matches!(err, InferenceError::Api { status: 404, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_ollama_prose_answer_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.1",
            "message": {"role": "assistant", "content": "Sure! Here is the graph:"},
            "done": true
        })))
        .mount(&server)
        .await;

    let provider = OllamaStructuredProvider::new(server.uri(), "llama3.1".to_string(), 0.0, 30);
    let err = provider.generate_structured(graph_request()).await.unwrap_err();

    assert!(matches!(err, InferenceError::MalformedOutput(_)));
}
