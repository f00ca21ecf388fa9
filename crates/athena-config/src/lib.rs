//! # Athena Configuration
//!
//! Typed configuration for the knowledge-graph pipeline: inference provider,
//! extraction options, assembly settings and graph storage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use athena_config::AthenaConfig;
//!
//! let config = AthenaConfig::load_from_file("athena.toml")?;
//! println!("extracting with {}", config.llm.model);
//! # Ok::<(), athena_config::ConfigError>(())
//! ```

#![warn(clippy::all)]

pub mod components;
mod config;

pub use components::*;
pub use config::*;
