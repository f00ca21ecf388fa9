//! Graph sink contract

use super::error::SinkResult;
use crate::graph::GraphDocument;
use async_trait::async_trait;

/// Persistence boundary for assembled graph documents
///
/// # Upsert semantics
///
/// Nodes merge on (id, type); relationships merge on (source, target, type).
/// Properties of an existing element are overwritten key by key. Upserting the same
/// document twice leaves the store unchanged after the first call, and independent
/// notes that mention the same entity converge on one node.
///
/// # Threading
///
/// Implementations must tolerate concurrent `upsert` calls from independent
/// note-processing runs.
#[async_trait]
pub trait GraphSink: Send + Sync {
    /// Merge a document into the store, taking ownership of it
    async fn upsert(&self, document: GraphDocument) -> SinkResult<UpsertSummary>;

    /// Delete every node and relationship
    ///
    /// With `confirmed == false` this is a no-op that returns
    /// [`WipeOutcome::Skipped`]; it never errors and never partially deletes.
    async fn wipe_all(&self, confirmed: bool) -> SinkResult<WipeOutcome>;

    /// Static name for logging
    fn name(&self) -> &'static str;

    /// Health status for monitoring
    async fn health_check(&self) -> SinkHealth {
        SinkHealth::Healthy
    }
}

/// What an upsert changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub nodes_created: usize,
    pub nodes_merged: usize,
    pub relationships_created: usize,
    pub relationships_merged: usize,
}

impl UpsertSummary {
    pub fn nodes_total(&self) -> usize {
        self.nodes_created + self.nodes_merged
    }

    pub fn relationships_total(&self) -> usize {
        self.relationships_created + self.relationships_merged
    }
}

/// Result of a wipe request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeOutcome {
    /// Confirmation was not given; nothing was touched
    Skipped,
    /// Everything was deleted
    Wiped {
        nodes_removed: usize,
        relationships_removed: usize,
    },
}

impl WipeOutcome {
    pub fn was_wiped(&self) -> bool {
        matches!(self, Self::Wiped { .. })
    }
}

/// Health status of a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkHealth {
    /// Sink is operating normally
    Healthy,

    /// Sink is experiencing issues but still functional
    Degraded {
        /// Reason for degradation
        reason: String,
    },

    /// Sink cannot process writes
    Unhealthy {
        /// Reason for unhealthy status
        reason: String,
    },
}

impl SinkHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded { .. } => "degraded",
            Self::Unhealthy { .. } => "unhealthy",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Degraded { reason } | Self::Unhealthy { reason } => Some(reason),
            Self::Healthy => None,
        }
    }
}
