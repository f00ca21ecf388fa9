//! Canonical graph primitives and the assembled graph document
//!
//! [`GraphNode`] and [`GraphRelationship`] are what the normalizer produces and what
//! sinks persist. A [`GraphDocument`] collects everything produced for one note:
//! structural vault/note/chunk nodes, extracted entities, and the edges between them.
//!
//! Nodes are identified by [`NodeKey`] (id + type) and relationships by
//! [`RelationshipKey`] (source key + target key + type). Adding an existing key
//! merges properties instead of duplicating the element.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Property mapping with first-insertion iteration order
pub type PropertyMap = IndexMap<String, String>;

/// Labels for the structural layer of the graph
pub mod labels {
    /// Originating collection of notes
    pub const VAULT: &str = "ObsidianVault";
    /// One source file
    pub const NOTE: &str = "ObsidianNote";
    /// One embedded text segment of a note
    pub const CHUNK: &str = "ObsidianNoteChunk";

    /// vault → note
    pub const HAS_NOTE: &str = "HAS_NOTE";
    /// note → chunk
    pub const HAS_CHUNK: &str = "HAS_CHUNK";
    /// chunk → extracted entity
    pub const MENTIONS: &str = "MENTIONS";
}

/// Identity of a node: identifier plus type label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

impl NodeKey {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
        }
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.node_type, self.id)
    }
}

/// Identity of a relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationshipKey {
    pub source: NodeKey,
    pub target: NodeKey,
    #[serde(rename = "type")]
    pub rel_type: String,
}

/// A canonical node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: PropertyMap::new(),
        }
    }

    /// Builder-style: set a property (overwrites an existing value in place)
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.id.clone(), self.node_type.clone())
    }

    /// Display name, falling back to the identifier
    pub fn name(&self) -> &str {
        self.properties
            .get("name")
            .map(String::as_str)
            .unwrap_or(&self.id)
    }

    /// Merge another node's properties into this one (last write wins)
    pub fn merge_properties(&mut self, properties: &PropertyMap) {
        for (key, value) in properties {
            self.properties.insert(key.clone(), value.clone());
        }
    }
}

/// A canonical, directed relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRelationship {
    pub source: GraphNode,
    pub target: GraphNode,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl GraphRelationship {
    pub fn new(source: GraphNode, target: GraphNode, rel_type: impl Into<String>) -> Self {
        Self {
            source,
            target,
            rel_type: rel_type.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn key(&self) -> RelationshipKey {
        RelationshipKey {
            source: self.source.key(),
            target: self.target.key(),
            rel_type: self.rel_type.clone(),
        }
    }
}

/// Where a document came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub vault: String,
    pub note_id: String,
    pub file_name: String,
}

/// Everything extracted from one note, ready for a [`GraphSink`](crate::GraphSink)
///
/// Nodes and relationships keep the order in which they were first added.
#[derive(Debug, Clone, Serialize)]
pub struct GraphDocument {
    source: DocumentSource,
    #[serde(serialize_with = "serialize_values")]
    nodes: IndexMap<NodeKey, GraphNode>,
    #[serde(serialize_with = "serialize_values")]
    relationships: IndexMap<RelationshipKey, GraphRelationship>,
    created_at: DateTime<Utc>,
}

impl GraphDocument {
    pub fn new(source: DocumentSource) -> Self {
        Self {
            source,
            nodes: IndexMap::new(),
            relationships: IndexMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Add a node, merging properties into an existing node with the same key
    ///
    /// Relationship endpoints with the same key are updated to the merged properties.
    pub fn add_node(&mut self, node: GraphNode) -> NodeKey {
        let key = node.key();
        match self.nodes.get_mut(&key) {
            Some(existing) => {
                existing.merge_properties(&node.properties);
                let merged = existing.clone();
                self.refresh_endpoints(&merged);
            }
            None => {
                self.nodes.insert(key.clone(), node);
            }
        }
        key
    }

    /// Add a relationship and both of its endpoints
    ///
    /// Returns `true` if the relationship was new to this document. Stored endpoints
    /// always mirror the document's node of the same key.
    pub fn add_relationship(&mut self, mut relationship: GraphRelationship) -> bool {
        let source = self.add_node(relationship.source.clone());
        let target = self.add_node(relationship.target.clone());

        let key = relationship.key();
        match self.relationships.get_mut(&key) {
            Some(existing) => {
                for (k, v) in &relationship.properties {
                    existing.properties.insert(k.clone(), v.clone());
                }
                false
            }
            None => {
                if let Some(node) = self.nodes.get(&source) {
                    relationship.source = node.clone();
                }
                if let Some(node) = self.nodes.get(&target) {
                    relationship.target = node.clone();
                }
                self.relationships.insert(key, relationship);
                true
            }
        }
    }

    fn refresh_endpoints(&mut self, node: &GraphNode) {
        for rel in self.relationships.values_mut() {
            for endpoint in [&mut rel.source, &mut rel.target] {
                if endpoint.id == node.id && endpoint.node_type == node.node_type {
                    endpoint.properties = node.properties.clone();
                }
            }
        }
    }

    pub fn node(&self, key: &NodeKey) -> Option<&GraphNode> {
        self.nodes.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &GraphRelationship> {
        self.relationships.values()
    }

    /// Nodes carrying the given type label
    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes.values().filter(move |n| n.node_type == node_type)
    }

    /// Relationships carrying the given type label
    pub fn relationships_of_type<'a>(
        &'a self,
        rel_type: &'a str,
    ) -> impl Iterator<Item = &'a GraphRelationship> {
        self.relationships
            .values()
            .filter(move |r| r.rel_type == rel_type)
    }

    /// Outgoing relationships of a node
    pub fn relationships_from<'a>(
        &'a self,
        source: &'a NodeKey,
    ) -> impl Iterator<Item = &'a GraphRelationship> {
        self.relationships
            .values()
            .filter(move |r| &r.source.key() == source)
    }

    pub fn contains_relationship(&self, key: &RelationshipKey) -> bool {
        self.relationships.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Consume the document, yielding nodes and relationships in insertion order
    pub fn into_parts(self) -> (DocumentSource, Vec<GraphNode>, Vec<GraphRelationship>) {
        (
            self.source,
            self.nodes.into_values().collect(),
            self.relationships.into_values().collect(),
        )
    }
}

fn serialize_values<K, V, S>(map: &IndexMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    V: Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.values())
}
