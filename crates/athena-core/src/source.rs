//! Chunk source boundary
//!
//! Chunking and embedding happen elsewhere. The pipeline only needs, for a given note
//! identifier, the note's file metadata and its chunks in order, each with the
//! identifier of its stored embedding.

use crate::error::TimeoutError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// One embedded text segment of a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceChunk {
    /// Unique chunk identifier
    pub chunk_id: String,
    /// Chunk text handed to extraction
    pub text: String,
    /// Reference to the chunk's vector in the embedding store
    pub embedding_id: String,
}

impl SourceChunk {
    pub fn new(
        chunk_id: impl Into<String>,
        text: impl Into<String>,
        embedding_id: impl Into<String>,
    ) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            text: text.into(),
            embedding_id: embedding_id.into(),
        }
    }
}

/// A resolved note: metadata plus chunks in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSource {
    pub note_id: String,
    pub file_name: String,
    pub chunks: Vec<SourceChunk>,
}

impl NoteSource {
    pub fn new(note_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            note_id: note_id.into(),
            file_name: file_name.into(),
            chunks: Vec::new(),
        }
    }

    /// Builder-style: append a chunk
    #[must_use]
    pub fn with_chunk(mut self, chunk: SourceChunk) -> Self {
        self.chunks.push(chunk);
        self
    }
}

/// Chunk source errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The note cannot be resolved (unknown id, store unreachable)
    #[error("Source unavailable for note '{note_id}': {reason}")]
    Unavailable { note_id: String, reason: String },

    /// The lookup exceeded its deadline
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

/// Result type for chunk source operations
pub type SourceResult<T> = Result<T, SourceError>;

impl SourceError {
    pub fn unavailable(note_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            note_id: note_id.into(),
            reason: reason.into(),
        }
    }
}

/// Resolves a note identifier to its chunks
///
/// Resolution must be restartable: resolving the same note twice yields the same
/// chunks in the same order.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    async fn resolve(&self, note_id: &str) -> SourceResult<NoteSource>;
}

/// In-memory implementation of [`ChunkSource`]
///
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryChunkSource {
    notes: Arc<RwLock<HashMap<String, NoteSource>>>,
}

impl InMemoryChunkSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a note
    pub async fn insert(&self, note: NoteSource) {
        self.notes.write().await.insert(note.note_id.clone(), note);
    }

    pub async fn remove(&self, note_id: &str) -> Option<NoteSource> {
        self.notes.write().await.remove(note_id)
    }

    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notes.read().await.is_empty()
    }
}

#[async_trait]
impl ChunkSource for InMemoryChunkSource {
    async fn resolve(&self, note_id: &str) -> SourceResult<NoteSource> {
        self.notes
            .read()
            .await
            .get(note_id)
            .cloned()
            .ok_or_else(|| SourceError::unavailable(note_id, "note not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_known_note() {
        let source = InMemoryChunkSource::new();
        source
            .insert(
                NoteSource::new("n1", "alice.md")
                    .with_chunk(SourceChunk::new("c1", "Alice met Bob.", "e1"))
                    .with_chunk(SourceChunk::new("c2", "Bob works at Acme.", "e2")),
            )
            .await;

        let note = source.resolve("n1").await.unwrap();
        assert_eq!(note.file_name, "alice.md");
        let ids: Vec<&str> = note.chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);

        // Restartable
        assert_eq!(source.resolve("n1").await.unwrap(), note);
    }

    #[tokio::test]
    async fn test_resolve_unknown_note() {
        let source = InMemoryChunkSource::new();
        let err = source.resolve("missing").await.unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { ref note_id, .. } if note_id == "missing"));
    }
}
