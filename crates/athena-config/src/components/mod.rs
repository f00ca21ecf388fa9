//! Configuration components, one per pipeline concern

pub mod extraction;
pub mod llm;
pub mod pipeline;
pub mod storage;

pub use extraction::*;
pub use llm::*;
pub use pipeline::*;
pub use storage::*;
