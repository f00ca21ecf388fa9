//! Top-level configuration and loading

use crate::components::{ExtractionConfig, LlmConfig, PipelineConfig, StorageConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value outside its valid range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Complete pipeline configuration
///
/// Every section is optional in the file; missing sections take their defaults.
///
/// ```toml
/// [llm]
/// provider = "openai"
/// model = "gpt-4-1106-preview"
///
/// [extraction]
/// allowed_nodes = ["Person", "Organization"]
///
/// [pipeline]
/// vault_name = "research"
/// max_concurrent_chunks = 4
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AthenaConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AthenaConfig {
    /// Parse and validate config from a TOML string
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&contents)
    }

    /// Default location: `<config dir>/athena/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("athena").join("config.toml"))
    }

    /// Load from the default location, or defaults if no file exists there
    pub fn load_or_default() -> ConfigResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::invalid("llm.model", "must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::invalid(
                "llm.temperature",
                format!("{} is outside 0.0-2.0", self.llm.temperature),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::invalid("llm.timeout_secs", "must be positive"));
        }
        if self.extraction.timeout_secs == Some(0) {
            return Err(ConfigError::invalid(
                "extraction.timeout_secs",
                "must be positive",
            ));
        }
        if self.pipeline.max_concurrent_chunks == 0 {
            return Err(ConfigError::invalid(
                "pipeline.max_concurrent_chunks",
                "must be at least 1",
            ));
        }
        if self.pipeline.vault_name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "pipeline.vault_name",
                "must not be empty",
            ));
        }
        Ok(())
    }
}
