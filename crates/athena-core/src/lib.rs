//! # Athena Core
//!
//! Domain layer for turning markdown notes into a knowledge graph.
//!
//! This crate owns the types every other Athena crate speaks:
//!
//! - **schema**: the structure a language model must emit ([`KnowledgeGraph`])
//! - **normalize**: pure functions mapping raw extractions to canonical graph primitives
//! - **graph**: canonical nodes, relationships and the assembled [`GraphDocument`]
//! - **inference**: the [`InferenceProvider`] boundary to a structured-output model
//! - **extraction**: the [`GraphExtractor`] contract (one chunk in, one graph out)
//! - **source**: the [`ChunkSource`] boundary to the chunk/embedding store
//! - **sink**: the [`GraphSink`] boundary to graph persistence
//!
//! ## Dependency Inversion
//!
//! Core defines abstractions only. Providers live in `athena-llm`, the extractor in
//! `athena-enrichment`, persistence in `athena-sqlite`, and orchestration in
//! `athena-pipeline`. In-memory implementations of the source and sink are kept here
//! so higher layers can be tested without infrastructure.

pub mod error;
pub mod extraction;
pub mod graph;
pub mod inference;
pub mod normalize;
pub mod schema;
pub mod sink;
pub mod source;

pub use error::{ExtractionError, ExtractionResult, TimeoutError, ValidationError};
pub use extraction::GraphExtractor;
pub use graph::{
    labels, DocumentSource, GraphDocument, GraphNode, GraphRelationship, NodeKey, PropertyMap,
    RelationshipKey,
};
pub use inference::{
    InferenceError, InferenceProvider, InferenceResult, PromptMessage, PromptRole,
    StructuredRequest,
};
pub use normalize::{
    capitalize, format_property_key, map_to_base_node, map_to_base_relationship, props_to_dict,
    title_case,
};
pub use schema::{KnowledgeGraph, Node, Property, Relationship};
pub use sink::{
    GraphSink, InMemoryGraphSink, SinkError, SinkHealth, SinkResult, UpsertSummary, WipeOutcome,
};
pub use source::{
    ChunkSource, InMemoryChunkSource, NoteSource, SourceChunk, SourceError, SourceResult,
};
