//! Graph storage settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// SQLite database file; `None` resolves to the platform data dir
    pub path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

fn default_true() -> bool {
    true
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            wal_mode: true,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StorageConfig {
    /// Database path, falling back to `<data dir>/athena/graph.db`
    pub fn database_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("athena")
                .join("graph.db")
        })
    }
}
