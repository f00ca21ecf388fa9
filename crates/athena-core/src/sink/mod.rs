//! Graph persistence boundary
//!
//! - [`GraphSink`]: bulk upsert + confirmed wipe
//! - [`InMemoryGraphSink`]: shared in-memory implementation

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{SinkError, SinkResult};
pub use memory::InMemoryGraphSink;
pub use traits::{GraphSink, SinkHealth, UpsertSummary, WipeOutcome};
