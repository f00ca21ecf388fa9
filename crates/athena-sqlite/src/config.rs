//! Connection settings for the SQLite sink

use athena_config::StorageConfig;
use std::path::{Path, PathBuf};

/// SQLite connection configuration
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,
    /// Write-ahead logging with `synchronous = NORMAL`
    pub wal_mode: bool,
    /// Enforce relationship → node references
    pub foreign_keys: bool,
    pub busy_timeout_ms: u32,
    /// Page cache size; negative values are KiB
    pub cache_size: i64,
    /// Memory-mapped I/O budget in bytes; 0 disables it
    pub mmap_size: u64,
}

impl SqliteConfig {
    /// On-disk database at `path` with default settings
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5000,
            cache_size: -16_000,
            mmap_size: 0,
        }
    }

    /// Private in-memory database, gone when the pool is dropped
    pub fn memory() -> Self {
        Self {
            wal_mode: false,
            ..Self::new(":memory:")
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(":memory:")
    }

    #[must_use]
    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u32) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    #[must_use]
    pub fn with_wal_mode(mut self, wal_mode: bool) -> Self {
        self.wal_mode = wal_mode;
        self
    }
}

impl From<&StorageConfig> for SqliteConfig {
    fn from(storage: &StorageConfig) -> Self {
        Self::new(storage.database_path())
            .with_wal_mode(storage.wal_mode)
            .with_busy_timeout_ms(storage.busy_timeout_ms)
    }
}
