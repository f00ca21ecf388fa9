//! # Athena Enrichment
//!
//! Turns one chunk of note text into one validated [`KnowledgeGraph`](athena_core::KnowledgeGraph).
//!
//! ## Architecture
//!
//! - **prompt**: the fixed extraction instructions plus optional allow-lists
//! - **extractor**: [`KnowledgeGraphExtractor`], the model-backed
//!   [`GraphExtractor`](athena_core::GraphExtractor)
//!
//! The extractor depends on the `InferenceProvider` trait from `athena-core`, never on
//! a concrete provider.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use athena_core::GraphExtractor;
//! use athena_enrichment::{ExtractionOptions, KnowledgeGraphExtractor};
//! use std::sync::Arc;
//!
//! # async fn run(provider: Arc<dyn athena_core::InferenceProvider>) -> athena_core::ExtractionResult<()> {
//! let extractor = KnowledgeGraphExtractor::new(
//!     provider,
//!     ExtractionOptions::default().with_allowed_nodes(["Person", "Organization"]),
//! );
//! let graph = extractor.extract("Alice works at Acme.").await?;
//! println!("{} nodes", graph.nodes.len());
//! # Ok(())
//! # }
//! ```

pub mod extractor;
pub mod prompt;

pub use extractor::{ExtractionOptions, KnowledgeGraphExtractor};
pub use prompt::{extraction_messages, system_instruction};
