//! Error types shared across the extraction pipeline
//!
//! Normalization is total and has no error type. Only validation of model output,
//! inference, and bounded waits can fail at this layer; source and sink errors live
//! next to their traits.

use crate::inference::InferenceError;
use std::time::Duration;
use thiserror::Error;

/// Model output does not conform to the [`KnowledgeGraph`](crate::KnowledgeGraph) schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Schema validation failed: {message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable description of what did not conform
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A bounded operation exceeded its deadline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} timed out after {duration_ms}ms")]
pub struct TimeoutError {
    pub operation: String,
    pub duration_ms: u64,
}

impl TimeoutError {
    pub fn new<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self {
            operation: operation.into(),
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// Failure to obtain a validated graph from one chunk
#[derive(Error, Debug, Clone)]
pub enum ExtractionError {
    /// The inference capability failed (network, auth, unusable response)
    #[error("Inference failed: {0}")]
    Inference(InferenceError),

    /// The model answered, but the answer does not satisfy the schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The inference call exceeded its deadline
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

/// Result type for extraction operations
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Provider timeouts and unparseable payloads keep their own categories
impl From<InferenceError> for ExtractionError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Timeout { duration_ms } => Self::Timeout(TimeoutError {
                operation: "inference".to_string(),
                duration_ms,
            }),
            InferenceError::MalformedOutput(message) => {
                Self::Validation(ValidationError::new(message))
            }
            other => Self::Inference(other),
        }
    }
}

impl ExtractionError {
    /// Whether a caller-side retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Inference(err) => err.is_retryable(),
            Self::Timeout(_) => true,
            Self::Validation(_) => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
