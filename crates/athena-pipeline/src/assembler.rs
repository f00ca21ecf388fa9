//! Note graph assembly
//!
//! One note in, one [`GraphDocument`] out:
//!
//! ```text
//! LOOKUP_SOURCE ─> for each chunk { EXTRACT ─> NORMALIZE ─> ATTACH } ─> FINALIZE
//! ```
//!
//! Extraction calls may overlap up to `max_concurrent_chunks`, but results are attached
//! by this task alone, in source order, so the document does not depend on which call
//! finishes first.

use crate::outcome::{AssemblyError, AssemblyMetrics, AssemblyOutcome, AssemblyResult, ChunkFailure};
use athena_config::PipelineConfig;
use athena_core::{
    labels, map_to_base_node, map_to_base_relationship, ChunkSource, DocumentSource,
    GraphDocument, GraphExtractor, GraphNode, GraphRelationship, KnowledgeGraph, NoteSource,
    SourceChunk, TimeoutError,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Settings for [`NoteGraphAssembler`]
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Identifier of the root vault node
    pub vault_name: String,
    /// Extraction calls allowed in flight at once (values below 1 act as 1)
    pub max_concurrent_chunks: usize,
    /// Deadline for resolving the chunk source
    pub source_timeout: Option<Duration>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for AssemblerConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            vault_name: config.vault_name.clone(),
            max_concurrent_chunks: config.max_concurrent_chunks,
            source_timeout: Some(Duration::from_secs(config.source_timeout_secs)),
        }
    }
}

/// Builds the graph document for a note
///
/// The assembler has no side effects besides logging: it reads from the
/// [`ChunkSource`], calls the [`GraphExtractor`], and returns the document. Persisting
/// it is the caller's job (see [`ingest_note`](crate::ingest_note)).
pub struct NoteGraphAssembler {
    source: Arc<dyn ChunkSource>,
    extractor: Arc<dyn GraphExtractor>,
    config: AssemblerConfig,
}

impl NoteGraphAssembler {
    /// Create an assembler with default configuration
    pub fn new(source: Arc<dyn ChunkSource>, extractor: Arc<dyn GraphExtractor>) -> Self {
        Self::with_config(source, extractor, AssemblerConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn ChunkSource>,
        extractor: Arc<dyn GraphExtractor>,
        config: AssemblerConfig,
    ) -> Self {
        Self {
            source,
            extractor,
            config,
        }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Assemble a note that cannot be cancelled
    pub async fn assemble(&self, note_id: &str) -> AssemblyResult<AssemblyOutcome> {
        self.assemble_with_cancel(note_id, &CancellationToken::new())
            .await
    }

    /// Assemble a note, stopping early once `cancel` fires
    ///
    /// Cancellation is checked before the source lookup and after each chunk
    /// completes. In-flight extraction calls are dropped, not awaited.
    pub async fn assemble_with_cancel(
        &self,
        note_id: &str,
        cancel: &CancellationToken,
    ) -> AssemblyResult<AssemblyOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("assemble_note", %note_id, %run_id);
        self.run(note_id, cancel).instrument(span).await
    }

    async fn run(&self, note_id: &str, cancel: &CancellationToken) -> AssemblyResult<AssemblyOutcome> {
        let start = Instant::now();
        let mut metrics = AssemblyMetrics::default();

        if cancel.is_cancelled() {
            return Err(AssemblyError::Cancelled {
                note_id: note_id.to_string(),
                chunks_completed: 0,
            });
        }

        // Lookup
        let lookup_start = Instant::now();
        let note = self.lookup(note_id).await?;
        metrics.lookup_duration = lookup_start.elapsed();
        metrics.chunks_total = note.chunks.len();

        let total_chunks = note.chunks.len();
        info!(note_id, file_name = %note.file_name, total_chunks, "Assembling note");

        let NoteSource {
            note_id: resolved_id,
            file_name,
            chunks,
        } = note;
        let mut document = GraphDocument::new(DocumentSource {
            vault: self.config.vault_name.clone(),
            note_id: resolved_id.clone(),
            file_name: file_name.clone(),
        });

        // Extract, normalize, attach
        let extraction_start = Instant::now();
        let mut chunk_nodes = Vec::with_capacity(total_chunks);
        let mut failures = Vec::new();
        let limit = self.config.max_concurrent_chunks.max(1);

        let mut results = stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| {
                let extractor = Arc::clone(&self.extractor);
                async move {
                    let result = extractor.extract(&chunk.text).await;
                    (index, chunk, result)
                }
            })
            .buffered(limit);

        while let Some((index, chunk, result)) = results.next().await {
            match result {
                Ok(graph) => {
                    let node = chunk_node(&chunk, index);
                    let mentioned = attach_chunk(&mut document, &node, &graph);
                    chunk_nodes.push(node);
                    info!(
                        chunk_id = %chunk.chunk_id,
                        chunk_index = index + 1,
                        total_chunks,
                        entities = mentioned,
                        "Processed chunk {}/{}",
                        index + 1,
                        total_chunks
                    );
                }
                Err(error) => {
                    warn!(
                        chunk_id = %chunk.chunk_id,
                        chunk_index = index + 1,
                        total_chunks,
                        retryable = error.is_retryable(),
                        error = %error,
                        "Chunk extraction failed, continuing"
                    );
                    failures.push(ChunkFailure {
                        chunk_id: chunk.chunk_id,
                        index,
                        error,
                    });
                }
            }

            if cancel.is_cancelled() {
                let chunks_completed = chunk_nodes.len() + failures.len();
                info!(note_id, chunks_completed, "Assembly cancelled");
                return Err(AssemblyError::Cancelled {
                    note_id: note_id.to_string(),
                    chunks_completed,
                });
            }
        }
        metrics.extraction_duration = extraction_start.elapsed();

        // Finalize
        finalize(
            &mut document,
            &self.config.vault_name,
            &resolved_id,
            &file_name,
            &chunk_nodes,
        );

        metrics.chunks_processed = chunk_nodes.len();
        metrics.chunks_failed = failures.len();
        metrics.nodes = document.node_count();
        metrics.relationships = document.relationship_count();
        metrics.total_duration = start.elapsed();

        info!(
            note_id,
            nodes = metrics.nodes,
            relationships = metrics.relationships,
            chunks_failed = metrics.chunks_failed,
            total_ms = metrics.total_duration.as_millis() as u64,
            "Assembled note"
        );

        if failures.is_empty() {
            Ok(AssemblyOutcome::Complete { document, metrics })
        } else {
            Ok(AssemblyOutcome::Partial {
                document,
                failures,
                metrics,
            })
        }
    }

    async fn lookup(&self, note_id: &str) -> AssemblyResult<NoteSource> {
        let resolve = self.source.resolve(note_id);
        let note = match self.config.source_timeout {
            Some(limit) => tokio::time::timeout(limit, resolve)
                .await
                .map_err(|_| TimeoutError::new("source lookup", limit))?,
            None => resolve.await,
        };
        note.map_err(|e| {
            warn!(note_id, error = %e, "Chunk source lookup failed");
            AssemblyError::from(e)
        })
    }
}

fn chunk_node(chunk: &SourceChunk, index: usize) -> GraphNode {
    GraphNode::new(chunk.chunk_id.clone(), labels::CHUNK)
        .with_property("embedding_id", chunk.embedding_id.clone())
        .with_property("sequence", index.to_string())
}

/// Normalize one chunk's graph into the document; returns entities mentioned
fn attach_chunk(document: &mut GraphDocument, chunk: &GraphNode, graph: &KnowledgeGraph) -> usize {
    document.add_node(chunk.clone());
    let mut mentioned = 0;

    for node in &graph.nodes {
        let entity = map_to_base_node(node);
        if document.add_relationship(GraphRelationship::new(chunk.clone(), entity, labels::MENTIONS)) {
            mentioned += 1;
        }
    }

    for rel in &graph.rels {
        let rel = map_to_base_relationship(rel);
        for endpoint in [&rel.source, &rel.target] {
            let mention = GraphRelationship::new(chunk.clone(), endpoint.clone(), labels::MENTIONS);
            if document.add_relationship(mention) {
                mentioned += 1;
            }
        }
        document.add_relationship(rel);
    }

    debug!(chunk_id = %chunk.id, mentioned, "Attached chunk graph");
    mentioned
}

fn finalize(
    document: &mut GraphDocument,
    vault_name: &str,
    note_id: &str,
    file_name: &str,
    chunk_nodes: &[GraphNode],
) {
    let vault = GraphNode::new(vault_name, labels::VAULT).with_property("name", vault_name);
    let note = GraphNode::new(note_id, labels::NOTE)
        .with_property("file_name", file_name)
        .with_property("name", file_name);

    document.add_relationship(GraphRelationship::new(vault, note.clone(), labels::HAS_NOTE));
    for chunk in chunk_nodes {
        document.add_relationship(GraphRelationship::new(
            note.clone(),
            chunk.clone(),
            labels::HAS_CHUNK,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use athena_core::{Node, Relationship};

    fn chunk() -> GraphNode {
        chunk_node(&SourceChunk::new("c1", "text", "e1"), 0)
    }

    #[test]
    fn test_chunk_node_properties() {
        let node = chunk();
        assert_eq!(node.node_type, "ObsidianNoteChunk");
        assert_eq!(node.properties.get("embedding_id").map(String::as_str), Some("e1"));
        assert_eq!(node.properties.get("sequence").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_relationship_endpoints_are_mentioned() {
        let mut document = GraphDocument::new(DocumentSource {
            vault: "v".to_string(),
            note_id: "n".to_string(),
            file_name: "n.md".to_string(),
        });
        let graph = KnowledgeGraph::new(
            vec![Node::new("alice", "person")],
            vec![Relationship::new(
                Node::new("alice", "person"),
                Node::new("acme", "organization"),
                "WORKS_AT",
            )],
        );

        let mentioned = attach_chunk(&mut document, &chunk(), &graph);

        // Alice counted once, Acme through the relationship
        assert_eq!(mentioned, 2);
        assert_eq!(document.relationships_of_type(labels::MENTIONS).count(), 2);
        assert_eq!(document.relationships_of_type("WORKS_AT").count(), 1);
        assert_eq!(document.node_count(), 3);
    }

    #[test]
    fn test_finalize_links_structure() {
        let mut document = GraphDocument::new(DocumentSource {
            vault: "v".to_string(),
            note_id: "n".to_string(),
            file_name: "n.md".to_string(),
        });
        finalize(&mut document, "v", "n", "n.md", &[chunk()]);

        assert_eq!(document.nodes_of_type(labels::VAULT).count(), 1);
        assert_eq!(document.nodes_of_type(labels::NOTE).count(), 1);
        assert_eq!(document.relationships_of_type(labels::HAS_NOTE).count(), 1);
        assert_eq!(document.relationships_of_type(labels::HAS_CHUNK).count(), 1);
    }

    #[test]
    fn test_config_from_pipeline_config() {
        let config = AssemblerConfig::from(
            &PipelineConfig::default()
                .with_vault_name("research")
                .with_max_concurrent_chunks(4),
        );
        assert_eq!(config.vault_name, "research");
        assert_eq!(config.max_concurrent_chunks, 4);
        assert_eq!(config.source_timeout, Some(Duration::from_secs(30)));
    }
}
