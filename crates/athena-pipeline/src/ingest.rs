//! Assemble-then-persist convenience

use crate::assembler::NoteGraphAssembler;
use crate::outcome::{AssemblyMetrics, AssemblyOutcome, ChunkFailure};
use anyhow::{Context, Result};
use athena_core::{GraphSink, UpsertSummary};
use tracing::info;

/// What [`ingest_note`] did for one note
#[derive(Debug)]
pub struct IngestReport {
    pub note_id: String,
    pub upsert: UpsertSummary,
    /// Chunks left out of the persisted document
    pub failures: Vec<ChunkFailure>,
    pub metrics: AssemblyMetrics,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Assemble a note and upsert the result into `sink`
///
/// A partial document is still persisted; its failed chunks are returned in the
/// report so the caller can retry them. Source and sink failures abort.
pub async fn ingest_note(
    assembler: &NoteGraphAssembler,
    sink: &dyn GraphSink,
    note_id: &str,
) -> Result<IngestReport> {
    let outcome = assembler
        .assemble(note_id)
        .await
        .with_context(|| format!("Failed to assemble graph for note '{note_id}'"))?;

    let (document, failures, metrics) = match outcome {
        AssemblyOutcome::Complete { document, metrics } => (document, Vec::new(), metrics),
        AssemblyOutcome::Partial {
            document,
            failures,
            metrics,
        } => (document, failures, metrics),
    };

    let upsert = sink
        .upsert(document)
        .await
        .with_context(|| format!("Failed to persist graph for note '{note_id}' to {}", sink.name()))?;

    info!(
        note_id,
        sink = sink.name(),
        nodes_created = upsert.nodes_created,
        relationships_created = upsert.relationships_created,
        chunks_failed = failures.len(),
        "Ingested note"
    );

    Ok(IngestReport {
        note_id: note_id.to_string(),
        upsert,
        failures,
        metrics,
    })
}
