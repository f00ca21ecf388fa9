//! Error types for the SQLite sink

use athena_core::SinkError;
use thiserror::Error;

/// SQLite storage error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Stored properties could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The blocking worker running a statement panicked or was cancelled
    #[error("Blocking task failed: {0}")]
    Task(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<serde_json::Error> for SqliteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SqliteError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl SqliteError {
    /// Another connection held the lock past `busy_timeout`
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}

impl From<SqliteError> for SinkError {
    fn from(err: SqliteError) -> Self {
        if err.is_busy() {
            return Self::ConcurrentAccess(err.to_string());
        }
        match err {
            SqliteError::Connection(msg) => Self::ConnectionError(msg),
            SqliteError::Schema(msg) => Self::SchemaError(msg),
            SqliteError::Serialization(msg) => Self::SerializationError(msg),
            SqliteError::Task(msg) => Self::Other(msg),
            SqliteError::Rusqlite(e) => Self::UpsertFailed(e.to_string()),
        }
    }
}
