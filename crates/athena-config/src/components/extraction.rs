//! Extraction invoker settings

use serde::{Deserialize, Serialize};

/// Default per-chunk extraction timeout in seconds
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 120;

/// Settings for the per-chunk extraction call
///
/// Empty allow-lists mean "any type".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub allowed_nodes: Vec<String>,
    #[serde(default)]
    pub allowed_rels: Vec<String>,
    /// Log the prompt and raw model output at info level
    #[serde(default)]
    pub verbose: bool,
    /// Per-chunk deadline; `None` uses the default
    pub timeout_secs: Option<u64>,
}

impl ExtractionConfig {
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_EXTRACTION_TIMEOUT_SECS)
    }
}
