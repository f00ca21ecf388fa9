//! Extraction contract
//!
//! Defined in core so the pipeline depends on the abstraction, not on a particular
//! prompt or provider. `athena-enrichment` provides the model-backed implementation.

use crate::error::ExtractionResult;
use crate::schema::KnowledgeGraph;
use async_trait::async_trait;

/// Obtains one validated [`KnowledgeGraph`] from one chunk of text
#[async_trait]
pub trait GraphExtractor: Send + Sync {
    /// Extract entities and relationships from `chunk_text`
    ///
    /// Exactly one attempt is made. Retry policy belongs to the caller.
    async fn extract(&self, chunk_text: &str) -> ExtractionResult<KnowledgeGraph>;
}
