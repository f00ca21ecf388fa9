//! In-memory graph sink
//!
//! Useful for testing and for embedding the pipeline where persistence isn't needed.
//! All data is lost when the last clone is dropped.

use super::error::SinkResult;
use super::traits::{GraphSink, UpsertSummary, WipeOutcome};
use crate::graph::{GraphDocument, GraphNode, NodeKey, PropertyMap, RelationshipKey};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Default)]
struct StoredGraph {
    nodes: IndexMap<NodeKey, PropertyMap>,
    relationships: IndexMap<RelationshipKey, PropertyMap>,
}

/// In-memory implementation of [`GraphSink`]
///
/// Uses `Arc<RwLock<...>>` internally, so clones share the same store. Each upsert
/// holds the write lock for the whole document, so concurrent upserts apply
/// atomically with respect to each other.
#[derive(Clone, Default)]
pub struct InMemoryGraphSink {
    graph: Arc<RwLock<StoredGraph>>,
}

impl InMemoryGraphSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn node_count(&self) -> usize {
        self.graph.read().await.nodes.len()
    }

    pub async fn relationship_count(&self) -> usize {
        self.graph.read().await.relationships.len()
    }

    pub async fn is_empty(&self) -> bool {
        let graph = self.graph.read().await;
        graph.nodes.is_empty() && graph.relationships.is_empty()
    }

    /// Fetch a stored node with its merged properties
    pub async fn get_node(&self, id: &str, node_type: &str) -> Option<GraphNode> {
        let key = NodeKey::new(id, node_type);
        self.graph
            .read()
            .await
            .nodes
            .get(&key)
            .map(|properties| GraphNode {
                id: key.id.clone(),
                node_type: key.node_type.clone(),
                properties: properties.clone(),
            })
    }

    pub async fn has_relationship(&self, key: &RelationshipKey) -> bool {
        self.graph.read().await.relationships.contains_key(key)
    }
}

#[async_trait]
impl GraphSink for InMemoryGraphSink {
    async fn upsert(&self, document: GraphDocument) -> SinkResult<UpsertSummary> {
        let (source, nodes, relationships) = document.into_parts();
        let mut summary = UpsertSummary::default();
        let mut guard = self.graph.write().await;
        let graph = &mut *guard;

        for node in nodes {
            let key = node.key();
            match graph.nodes.get_mut(&key) {
                Some(existing) => {
                    existing.extend(node.properties);
                    summary.nodes_merged += 1;
                }
                None => {
                    graph.nodes.insert(key, node.properties);
                    summary.nodes_created += 1;
                }
            }
        }

        for relationship in relationships {
            let key = relationship.key();
            for endpoint in [&key.source, &key.target] {
                if !graph.nodes.contains_key(endpoint) {
                    graph.nodes.insert(endpoint.clone(), PropertyMap::new());
                    summary.nodes_created += 1;
                }
            }
            match graph.relationships.get_mut(&key) {
                Some(existing) => {
                    existing.extend(relationship.properties);
                    summary.relationships_merged += 1;
                }
                None => {
                    graph.relationships.insert(key, relationship.properties);
                    summary.relationships_created += 1;
                }
            }
        }

        debug!(
            note_id = %source.note_id,
            nodes_created = summary.nodes_created,
            relationships_created = summary.relationships_created,
            "In-memory upsert applied"
        );

        Ok(summary)
    }

    async fn wipe_all(&self, confirmed: bool) -> SinkResult<WipeOutcome> {
        if !confirmed {
            debug!("Wipe requested without confirmation, skipping");
            return Ok(WipeOutcome::Skipped);
        }

        let mut graph = self.graph.write().await;
        let outcome = WipeOutcome::Wiped {
            nodes_removed: graph.nodes.len(),
            relationships_removed: graph.relationships.len(),
        };
        graph.nodes.clear();
        graph.relationships.clear();

        info!(?outcome, "In-memory graph wiped");
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{labels, DocumentSource, GraphRelationship};

    fn document(note_id: &str) -> GraphDocument {
        let mut doc = GraphDocument::new(DocumentSource {
            vault: "vault".to_string(),
            note_id: note_id.to_string(),
            file_name: format!("{note_id}.md"),
        });
        let chunk = GraphNode::new(format!("{note_id}-chunk-0"), labels::CHUNK);
        let alice = GraphNode::new("Alice", "Person").with_property("name", "Alice");
        doc.add_relationship(GraphRelationship::new(chunk, alice, labels::MENTIONS));
        doc
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let sink = InMemoryGraphSink::new();

        let first = sink.upsert(document("n1")).await.unwrap();
        assert_eq!(first.nodes_created, 2);
        assert_eq!(first.relationships_created, 1);

        let second = sink.upsert(document("n1")).await.unwrap();
        assert_eq!(second.nodes_created, 0);
        assert_eq!(second.relationships_created, 0);
        assert_eq!(second.relationships_merged, 1);

        assert_eq!(sink.node_count().await, 2);
        assert_eq!(sink.relationship_count().await, 1);
    }

    #[tokio::test]
    async fn test_cross_note_entities_merge() {
        let sink = InMemoryGraphSink::new();
        sink.upsert(document("n1")).await.unwrap();
        sink.upsert(document("n2")).await.unwrap();

        // Alice shared, one chunk per note
        assert_eq!(sink.node_count().await, 3);
        assert_eq!(sink.relationship_count().await, 2);
        assert!(sink.get_node("Alice", "Person").await.is_some());
    }

    #[tokio::test]
    async fn test_wipe_requires_confirmation() {
        let sink = InMemoryGraphSink::new();
        sink.upsert(document("n1")).await.unwrap();

        let outcome = sink.wipe_all(false).await.unwrap();
        assert_eq!(outcome, WipeOutcome::Skipped);
        assert_eq!(sink.node_count().await, 2);

        let outcome = sink.wipe_all(true).await.unwrap();
        assert_eq!(
            outcome,
            WipeOutcome::Wiped {
                nodes_removed: 2,
                relationships_removed: 1
            }
        );
        assert!(sink.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_converge() {
        let sink = InMemoryGraphSink::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = sink.clone();
                tokio::spawn(async move { sink.upsert(document(&format!("n{}", i % 4))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(sink.node_count().await, 5);
        assert_eq!(sink.relationship_count().await, 4);
    }
}
