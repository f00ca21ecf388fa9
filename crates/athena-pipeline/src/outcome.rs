//! Assembly results and errors

use athena_core::{ExtractionError, GraphDocument, SourceError, TimeoutError};
use std::time::Duration;
use thiserror::Error;

/// A chunk whose extraction failed; the rest of the note was still assembled
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    pub chunk_id: String,
    /// Zero-based position of the chunk in the note
    pub index: usize,
    pub error: ExtractionError,
}

/// Metrics collected while assembling one note
#[derive(Debug, Clone, Default)]
pub struct AssemblyMetrics {
    /// Chunks the source returned
    pub chunks_total: usize,

    /// Chunks whose extraction succeeded and were attached
    pub chunks_processed: usize,

    /// Chunks whose extraction failed
    pub chunks_failed: usize,

    /// Nodes in the finished document, structural nodes included
    pub nodes: usize,

    /// Relationships in the finished document, structural edges included
    pub relationships: usize,

    /// Time spent resolving the chunk source
    pub lookup_duration: Duration,

    /// Time spent extracting and attaching chunks
    pub extraction_duration: Duration,

    /// Wall-clock time for the whole assembly
    pub total_duration: Duration,
}

/// Result of assembling one note
#[derive(Debug)]
pub enum AssemblyOutcome {
    /// Every chunk was extracted and attached
    Complete {
        document: GraphDocument,
        metrics: AssemblyMetrics,
    },
    /// Some chunks failed; the document covers exactly the chunks that succeeded
    Partial {
        document: GraphDocument,
        failures: Vec<ChunkFailure>,
        metrics: AssemblyMetrics,
    },
}

impl AssemblyOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    pub fn document(&self) -> &GraphDocument {
        match self {
            Self::Complete { document, .. } | Self::Partial { document, .. } => document,
        }
    }

    pub fn metrics(&self) -> &AssemblyMetrics {
        match self {
            Self::Complete { metrics, .. } | Self::Partial { metrics, .. } => metrics,
        }
    }

    /// Failed chunks in source order; empty when complete
    pub fn failures(&self) -> &[ChunkFailure] {
        match self {
            Self::Complete { .. } => &[],
            Self::Partial { failures, .. } => failures,
        }
    }

    /// Take the document, for handing to a sink
    pub fn into_document(self) -> GraphDocument {
        match self {
            Self::Complete { document, .. } | Self::Partial { document, .. } => document,
        }
    }
}

/// Failures that abort a whole note
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The note could not be resolved; no graph was produced
    #[error("Source unavailable for note '{note_id}': {reason}")]
    SourceUnavailable { note_id: String, reason: String },

    /// Source lookup exceeded its deadline
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// The caller cancelled the run
    #[error("Assembly of note '{note_id}' cancelled after {chunks_completed} chunk(s)")]
    Cancelled {
        note_id: String,
        chunks_completed: usize,
    },
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;

impl From<SourceError> for AssemblyError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable { note_id, reason } => {
                Self::SourceUnavailable { note_id, reason }
            }
            SourceError::Timeout(timeout) => Self::Timeout(timeout),
        }
    }
}

impl AssemblyError {
    /// Whether running the same note again could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_conversion() {
        let err: AssemblyError = SourceError::unavailable("n1", "note not found").into();
        assert!(matches!(err, AssemblyError::SourceUnavailable { ref note_id, .. } if note_id == "n1"));
        assert!(!err.is_retryable());

        let err: AssemblyError =
            SourceError::Timeout(TimeoutError::new("source lookup", Duration::from_secs(2))).into();
        assert!(matches!(err, AssemblyError::Timeout(_)));
        assert!(err.is_retryable());
    }
}
