//! Model-backed [`GraphExtractor`]

use crate::prompt::extraction_messages;
use athena_config::ExtractionConfig;
use athena_core::schema::{KNOWLEDGE_GRAPH_SCHEMA_DESCRIPTION, KNOWLEDGE_GRAPH_SCHEMA_NAME};
use athena_core::{
    ExtractionResult, GraphExtractor, InferenceProvider, KnowledgeGraph, StructuredRequest,
    TimeoutError,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-extractor options
#[derive(Debug, Clone, Default)]
pub struct ExtractionOptions {
    /// Advisory node labels; empty means unrestricted
    pub allowed_nodes: Vec<String>,
    /// Advisory relationship types; empty means unrestricted
    pub allowed_rels: Vec<String>,
    /// Log prompts and raw answers at info level
    pub verbose: bool,
    /// Deadline for the whole extraction call
    ///
    /// Enforced here, not sent to the provider; the provider's HTTP client keeps its
    /// own `llm.timeout_secs`.
    pub timeout: Option<Duration>,
    /// Temperature override for the provider
    pub temperature: Option<f32>,
}

impl ExtractionOptions {
    pub fn with_allowed_nodes<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_nodes = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allowed_rels<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_rels = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl From<&ExtractionConfig> for ExtractionOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            allowed_nodes: config.allowed_nodes.clone(),
            allowed_rels: config.allowed_rels.clone(),
            verbose: config.verbose,
            timeout: Some(Duration::from_secs(config.timeout_secs())),
            temperature: None,
        }
    }
}

/// Extracts a [`KnowledgeGraph`] from chunk text with one structured-output call
///
/// The schema offered to the model is derived from [`KnowledgeGraph`] once at
/// construction. Every answer is validated against the same types before it is
/// returned, so callers never see a graph that does not conform.
pub struct KnowledgeGraphExtractor {
    provider: Arc<dyn InferenceProvider>,
    options: ExtractionOptions,
    schema: serde_json::Value,
}

impl KnowledgeGraphExtractor {
    pub fn new(provider: Arc<dyn InferenceProvider>, options: ExtractionOptions) -> Self {
        Self {
            provider,
            options,
            schema: KnowledgeGraph::json_schema(),
        }
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// The request that [`extract`](GraphExtractor::extract) sends for `chunk_text`
    pub fn build_request(&self, chunk_text: &str) -> StructuredRequest {
        let messages = extraction_messages(
            chunk_text,
            &self.options.allowed_nodes,
            &self.options.allowed_rels,
        );
        let mut request = StructuredRequest::new(
            KNOWLEDGE_GRAPH_SCHEMA_NAME,
            KNOWLEDGE_GRAPH_SCHEMA_DESCRIPTION,
            self.schema.clone(),
            messages,
        );
        if let Some(temperature) = self.options.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }
}

#[async_trait]
impl GraphExtractor for KnowledgeGraphExtractor {
    async fn extract(&self, chunk_text: &str) -> ExtractionResult<KnowledgeGraph> {
        let request = self.build_request(chunk_text);
        let start = Instant::now();

        if self.options.verbose {
            for message in &request.messages {
                info!(role = message.role.as_str(), content = %message.content, "Extraction prompt");
            }
        } else {
            debug!(
                provider = self.provider.provider_name(),
                model = self.provider.model(),
                chars = chunk_text.len(),
                "Extracting knowledge graph"
            );
        }

        let call = self.provider.generate_structured(request);
        let result = match self.options.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "Extraction timed out");
                    return Err(TimeoutError::new("inference", limit).into());
                }
            },
            None => call.await,
        };

        let value = result.inspect_err(|e| warn!(error = %e, "Inference failed"))?;

        if self.options.verbose {
            info!(output = %value, "Raw model output");
        }

        let graph = KnowledgeGraph::from_value(value)
            .inspect_err(|e| warn!(error = %e, "Model output failed validation"))?;

        debug!(
            nodes = graph.nodes.len(),
            rels = graph.rels.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extraction complete"
        );

        Ok(graph)
    }
}
