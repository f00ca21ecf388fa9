//! Graph sink error types

use thiserror::Error;

/// Graph sink operation errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Upsert could not be applied
    #[error("Upsert failed: {0}")]
    UpsertFailed(String),

    /// Wipe could not be applied
    #[error("Wipe failed: {0}")]
    WipeFailed(String),

    /// Connection error to the persistence engine
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Operation timed out
    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Another writer holds the store
    #[error("Concurrent access: {0}")]
    ConcurrentAccess(String),

    /// Serialization/encoding error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Schema/migration error in the backing store
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// General error
    #[error("Sink error: {0}")]
    Other(String),
}

/// Specialized Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

impl SinkError {
    pub fn upsert_failed(msg: impl Into<String>) -> Self {
        Self::UpsertFailed(msg.into())
    }

    pub fn wipe_failed(msg: impl Into<String>) -> Self {
        Self::WipeFailed(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::Timeout(_) | Self::ConcurrentAccess(_)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::UpsertFailed(_) => "upsert_failed",
            Self::WipeFailed(_) => "wipe_failed",
            Self::ConnectionError(_) => "connection",
            Self::Timeout(_) => "timeout",
            Self::ConcurrentAccess(_) => "concurrent_access",
            Self::SerializationError(_) => "serialization",
            Self::SchemaError(_) => "schema",
            Self::Other(_) => "other",
        }
    }
}
