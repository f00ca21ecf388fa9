//! # Athena LLM
//!
//! Structured-output inference providers for the Athena extraction pipeline.
//!
//! Every provider implements [`athena_core::InferenceProvider`]: one request carrying a
//! JSON schema and prompt messages, one JSON value back. Providers never retry.
//!
//! ## Providers
//!
//! - [`OpenAIStructuredProvider`]: forced function calling on OpenAI-compatible APIs
//! - [`OllamaStructuredProvider`]: `format`-constrained output from a local Ollama
//!
//! ## Example
//!
//! ```rust,no_run
//! use athena_config::LlmConfig;
//! use athena_llm::create_inference_provider;
//!
//! let provider = create_inference_provider(&LlmConfig::preset("gpt-4-1106-preview"))?;
//! println!("using {} / {}", provider.provider_name(), provider.model());
//! # Ok::<(), athena_core::InferenceError>(())
//! ```

#![warn(clippy::all)]

pub mod chat;

// Mock provider for downstream tests
#[cfg(any(test, feature = "test-utils"))]
pub mod inference_mock;

pub use chat::{create_inference_provider, OllamaStructuredProvider, OpenAIStructuredProvider};

#[cfg(any(test, feature = "test-utils"))]
pub use inference_mock::{MockCall, MockInferenceProvider};
