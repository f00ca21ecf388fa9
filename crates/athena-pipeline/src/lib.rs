//! Pipeline Orchestration Layer
//!
//! This crate turns a note into a knowledge-graph document.
//!
//! ## Architecture
//!
//! The assembler coordinates four phases per note:
//! 1. **Lookup**: resolve the note's chunks through a `ChunkSource`
//! 2. **Extract**: one `GraphExtractor` call per chunk
//! 3. **Normalize + Attach**: canonical entities linked to their chunk node
//! 4. **Finalize**: vault → note → chunk structural edges
//!
//! ## Clear Separation of Concerns
//!
//! Infrastructure crates (DO NOT orchestrate):
//! - `athena-enrichment`: just extracts one chunk
//! - `athena-llm`: just talks to a model
//! - `athena-sqlite`: just persists documents
//!
//! This crate:
//! - Runs the phases in order and numbers chunks in source order
//! - Reports per-chunk failures without dropping the rest of the note
//! - Leaves persistence to the caller, or to [`ingest_note`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use athena_pipeline::{ingest_note, NoteGraphAssembler};
//!
//! let assembler = NoteGraphAssembler::new(chunk_source, extractor);
//! let outcome = assembler.assemble("note-42").await?;
//! for failure in outcome.failures() {
//!     eprintln!("chunk {} failed: {}", failure.chunk_id, failure.error);
//! }
//!
//! // Or assemble and persist in one go
//! let report = ingest_note(&assembler, &sink, "note-42").await?;
//! ```

pub mod assembler;
pub mod ingest;
pub mod outcome;

pub use assembler::{AssemblerConfig, NoteGraphAssembler};
pub use ingest::{ingest_note, IngestReport};
pub use outcome::{AssemblyError, AssemblyMetrics, AssemblyOutcome, AssemblyResult, ChunkFailure};

// Callers need the token type to cancel a run
pub use tokio_util::sync::CancellationToken;
