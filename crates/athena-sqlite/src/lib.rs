//! SQLite graph sink for Athena
//!
//! Persists assembled [`GraphDocument`](athena_core::GraphDocument)s through the
//! [`GraphSink`](athena_core::GraphSink) contract.
//!
//! ## Features
//!
//! - **Merge-on-key upserts**: nodes keyed by (id, type), relationships by
//!   (source, target, type), properties merged into a JSON object
//! - **Transactions**: an upsert or wipe applies completely or not at all
//! - **WAL Mode**: readers are not blocked by an ingest in progress
//! - **Migrations**: versioned schema tracked in `schema_migrations`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use athena_sqlite::{SqliteConfig, SqliteGraphSink, SqlitePool};
//!
//! let pool = SqlitePool::new(SqliteConfig::from(&config.storage))?;
//! let sink = SqliteGraphSink::new(pool);
//! let report = athena_pipeline::ingest_note(&assembler, &sink, "note-42").await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod schema;
pub mod sink;

pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use sink::SqliteGraphSink;
