//! Extraction schema
//!
//! The structure a language model is asked to emit for a single chunk of text.
//! Field doc comments double as the descriptions carried in the JSON schema that is
//! sent to the model, so keep them short and model-readable.
//!
//! Instances are only obtained through deserialization ([`KnowledgeGraph::from_value`],
//! [`KnowledgeGraph::from_json_str`]) or direct construction. Deserialization either
//! yields a fully valid value or a [`ValidationError`]; nothing partial escapes.

use crate::error::ValidationError;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Name under which the schema is offered to the model (function name for
/// function-calling providers).
pub const KNOWLEDGE_GRAPH_SCHEMA_NAME: &str = "KnowledgeGraph";

/// Description offered alongside the schema.
pub const KNOWLEDGE_GRAPH_SCHEMA_DESCRIPTION: &str =
    "Generate a knowledge graph with entities and relationships.";

/// A single property consisting of key and value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Property {
    /// key
    pub key: String,
    /// value
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An entity or concept in the knowledge graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Node {
    /// Name or human-readable unique identifier
    pub id: String,
    /// Basic or elementary type label of the node
    #[serde(rename = "type")]
    pub node_type: String,
    /// List of node properties
    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(with = "Option<Vec<Property>>")]
    pub properties: Vec<Property>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style: append a property
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::new(key, value));
        self
    }
}

/// A directed, typed relationship between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    /// Source node of the relationship
    pub source: Node,
    /// Target node of the relationship
    pub target: Node,
    /// Relationship type
    #[serde(rename = "type")]
    pub rel_type: String,
    /// List of relationship properties
    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(with = "Option<Vec<Property>>")]
    pub properties: Vec<Property>,
}

impl Relationship {
    pub fn new(source: Node, target: Node, rel_type: impl Into<String>) -> Self {
        Self {
            source,
            target,
            rel_type: rel_type.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style: append a property
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::new(key, value));
        self
    }
}

/// Generate a knowledge graph with entities and relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeGraph {
    /// List of nodes in the knowledge graph
    pub nodes: Vec<Node>,
    /// List of relationships in the knowledge graph
    pub rels: Vec<Relationship>,
}

impl KnowledgeGraph {
    pub fn new(nodes: Vec<Node>, rels: Vec<Relationship>) -> Self {
        Self { nodes, rels }
    }

    /// Validate a JSON value produced by a model against the schema.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(ValidationError::from)
    }

    /// Validate raw JSON text produced by a model against the schema.
    pub fn from_json_str(raw: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(raw).map_err(ValidationError::from)
    }

    /// JSON schema handed to the inference provider.
    ///
    /// The `$schema` meta key is stripped; function-calling APIs expect a bare object
    /// schema.
    pub fn json_schema() -> serde_json::Value {
        let mut value = schemars::schema_for!(KnowledgeGraph).to_value();
        if let Some(object) = value.as_object_mut() {
            object.remove("$schema");
        }
        value
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.rels.is_empty()
    }
}

// Models frequently send `"properties": null`; treat it like an absent list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Property>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Property>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_graph_parses() {
        let value = json!({
            "nodes": [
                {"id": "alice", "type": "person", "properties": [{"key": "Birth Date", "value": "1990"}]},
                {"id": "acme", "type": "organization"}
            ],
            "rels": [
                {
                    "source": {"id": "alice", "type": "person"},
                    "target": {"id": "acme", "type": "organization"},
                    "type": "WORKS_AT"
                }
            ]
        });

        let graph = KnowledgeGraph::from_value(value).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].properties, vec![Property::new("Birth Date", "1990")]);
        assert!(graph.nodes[1].properties.is_empty());
        assert_eq!(graph.rels[0].rel_type, "WORKS_AT");
        assert!(graph.rels[0].properties.is_empty());
    }

    #[test]
    fn test_null_properties_default_to_empty() {
        let value = json!({
            "nodes": [{"id": "x", "type": "thing", "properties": null}],
            "rels": []
        });

        let graph = KnowledgeGraph::from_value(value).unwrap();
        assert!(graph.nodes[0].properties.is_empty());
    }

    #[test]
    fn test_missing_rels_is_rejected() {
        let err = KnowledgeGraph::from_value(json!({"nodes": []})).unwrap_err();
        assert!(err.message().contains("rels"), "unexpected message: {err}");
    }

    #[test]
    fn test_missing_node_type_is_rejected() {
        let err = KnowledgeGraph::from_value(json!({
            "nodes": [{"id": "alice"}],
            "rels": []
        }))
        .unwrap_err();
        assert!(err.message().contains("type"), "unexpected message: {err}");
    }

    #[test]
    fn test_non_string_property_value_is_rejected() {
        let result = KnowledgeGraph::from_value(json!({
            "nodes": [{"id": "alice", "type": "person", "properties": [{"key": "age", "value": 42}]}],
            "rels": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_property_without_value_is_rejected() {
        let result = KnowledgeGraph::from_value(json!({
            "nodes": [{"id": "alice", "type": "person", "properties": [{"key": "age"}]}],
            "rels": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_graph_is_valid() {
        let graph = KnowledgeGraph::from_json_str(r#"{"nodes": [], "rels": []}"#).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(KnowledgeGraph::from_json_str("{nodes: ").is_err());
    }

    #[test]
    fn test_json_schema_describes_required_fields() {
        let schema = KnowledgeGraph::json_schema();

        assert!(schema.get("$schema").is_none());
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("nodes")));
        assert!(required.contains(&json!("rels")));

        let rendered = schema.to_string();
        assert!(rendered.contains("List of nodes in the knowledge graph"));
        assert!(rendered.contains("Relationship type"));
    }
}
