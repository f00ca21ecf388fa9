//! Document assembly settings

use serde::{Deserialize, Serialize};

/// Default vault name used for the root structural node
pub const DEFAULT_VAULT_NAME: &str = "vault";

/// Default chunk-source lookup timeout in seconds
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Name of the vault the notes belong to
    #[serde(default = "default_vault_name")]
    pub vault_name: String,
    /// Upper bound on extraction calls in flight for one note
    #[serde(default = "default_max_concurrent_chunks")]
    pub max_concurrent_chunks: usize,
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
}

fn default_vault_name() -> String {
    DEFAULT_VAULT_NAME.to_string()
}

fn default_max_concurrent_chunks() -> usize {
    1
}

fn default_source_timeout_secs() -> u64 {
    DEFAULT_SOURCE_TIMEOUT_SECS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vault_name: default_vault_name(),
            max_concurrent_chunks: default_max_concurrent_chunks(),
            source_timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    pub fn with_vault_name(mut self, vault_name: impl Into<String>) -> Self {
        self.vault_name = vault_name.into();
        self
    }

    pub fn with_max_concurrent_chunks(mut self, limit: usize) -> Self {
        self.max_concurrent_chunks = limit;
        self
    }
}
