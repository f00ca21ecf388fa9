//! Normalization of raw extractions into canonical graph primitives
//!
//! Every function here is pure, total and idempotent:
//!
//! - node identifiers are title-cased with whitespace runs collapsed, so
//!   `"john doe"` and `"John  Doe"` land on the same node
//! - node type labels are capitalized
//! - property keys are snake_cased on whitespace
//! - every node carries a `name` property equal to its canonical identifier
//!
//! Relationship type labels are passed through untouched.

use crate::graph::{GraphNode, GraphRelationship, PropertyMap};
use crate::schema::{Node, Property, Relationship};

/// Format a property key into snake case
///
/// Splits on whitespace, lower-cases each word and joins with `_`. Input without any
/// words is returned lower-cased as-is.
pub fn format_property_key(key: &str) -> String {
    let words: Vec<String> = key.split_whitespace().map(str::to_lowercase).collect();

    if words.is_empty() {
        return key.to_lowercase();
    }

    words.join("_")
}

/// Convert a property list into a mapping keyed by formatted key
///
/// Duplicate keys keep the position of their first occurrence and the value of
/// their last.
pub fn props_to_dict(props: &[Property]) -> PropertyMap {
    let mut properties = PropertyMap::with_capacity(props.len());

    for prop in props {
        properties.insert(format_property_key(&prop.key), prop.value.clone());
    }

    properties
}

/// Title-case an identifier
///
/// Words are separated by single spaces. Within a word, a letter is upper-cased when
/// it follows a non-letter (start of word, digit, apostrophe, hyphen) and lower-cased
/// otherwise.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for (i, word) in s.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }

        let mut previous_is_letter = false;
        for c in word.chars() {
            if c.is_alphabetic() {
                if previous_is_letter {
                    push_lower(&mut out, c);
                } else {
                    push_upper(&mut out, c);
                }
                previous_is_letter = true;
            } else {
                out.push(c);
                previous_is_letter = false;
            }
        }
    }

    out
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    let mut out = String::with_capacity(s.len());

    if let Some(first) = chars.next() {
        push_upper(&mut out, first);
        for c in chars {
            push_lower(&mut out, c);
        }
    }

    out
}

/// Map an extracted node to its canonical form
///
/// The `name` property is always set to the canonical identifier, overwriting any
/// extracted `name`.
pub fn map_to_base_node(node: &Node) -> GraphNode {
    let id = title_case(&node.id);
    let mut properties = props_to_dict(&node.properties);
    properties.insert("name".to_string(), id.clone());

    GraphNode {
        id,
        node_type: capitalize(&node.node_type),
        properties,
    }
}

/// Map an extracted relationship to its canonical form
pub fn map_to_base_relationship(rel: &Relationship) -> GraphRelationship {
    GraphRelationship {
        source: map_to_base_node(&rel.source),
        target: map_to_base_node(&rel.target),
        rel_type: rel.rel_type.clone(),
        properties: props_to_dict(&rel.properties),
    }
}

// Case mappings that expand to several chars (e.g. 'ß' -> "SS") would make the
// transforms non-idempotent, so those chars are kept unchanged.
fn push_upper(out: &mut String, c: char) {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => out.push(u),
        _ => out.push(c),
    }
}

fn push_lower(out: &mut String, c: char) {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => out.push(l),
        _ => out.push(c),
    }
}

impl From<&GraphNode> for Node {
    fn from(node: &GraphNode) -> Self {
        Node {
            id: node.id.clone(),
            node_type: node.node_type.clone(),
            properties: to_property_list(&node.properties),
        }
    }
}

impl From<&GraphRelationship> for Relationship {
    fn from(rel: &GraphRelationship) -> Self {
        Relationship {
            source: Node::from(&rel.source),
            target: Node::from(&rel.target),
            rel_type: rel.rel_type.clone(),
            properties: to_property_list(&rel.properties),
        }
    }
}

fn to_property_list(properties: &PropertyMap) -> Vec<Property> {
    properties
        .iter()
        .map(|(k, v)| Property::new(k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_property_key() {
        assert_eq!(format_property_key("Birth Date"), "birth_date");
        assert_eq!(format_property_key("  Place   of Birth "), "place_of_birth");
        assert_eq!(format_property_key("birthDate"), "birthdate");
        assert_eq!(format_property_key(""), "");
        assert_eq!(format_property_key("   "), "   ");
    }

    #[test]
    fn test_props_to_dict_last_write_wins() {
        let props = vec![
            Property::new("Birth Date", "1990"),
            Property::new("city", "Paris"),
            Property::new("birth  date", "1991"),
        ];

        let dict = props_to_dict(&props);

        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("birth_date").unwrap(), "1991");
        let keys: Vec<&str> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["birth_date", "city"]);
    }

    #[test]
    fn test_props_to_dict_empty() {
        assert!(props_to_dict(&[]).is_empty());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("john doe"), "John Doe");
        assert_eq!(title_case("John  Doe"), "John Doe");
        assert_eq!(title_case("JOHN DOE"), "John Doe");
        assert_eq!(title_case("jean-paul o'neil"), "Jean-Paul O'Neil");
        assert_eq!(title_case("  leading"), "Leading");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("person"), "Person");
        assert_eq!(capitalize("PERSON"), "Person");
        assert_eq!(capitalize("programming language"), "Programming language");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_map_to_base_node() {
        let node = Node::new("john doe", "person");
        let base = map_to_base_node(&node);

        assert_eq!(base.id, "John Doe");
        assert_eq!(base.node_type, "Person");
        assert_eq!(base.properties.len(), 1);
        assert_eq!(base.properties.get("name").unwrap(), "John Doe");
    }

    #[test]
    fn test_map_to_base_node_overwrites_extracted_name() {
        let node = Node::new("john doe", "person")
            .with_property("Name", "Johnny")
            .with_property("Birth Date", "1990-01-01");
        let base = map_to_base_node(&node);

        assert_eq!(base.properties.get("name").unwrap(), "John Doe");
        assert_eq!(base.properties.get("birth_date").unwrap(), "1990-01-01");
    }

    #[test]
    fn test_map_to_base_relationship_keeps_type() {
        let rel = Relationship::new(
            Node::new("john doe", "person"),
            Node::new("acme corp", "organization"),
            "works_at",
        )
        .with_property("Start Year", "2020");

        let base = map_to_base_relationship(&rel);

        assert_eq!(base.source.id, "John Doe");
        assert_eq!(base.target.id, "Acme Corp");
        assert_eq!(base.target.node_type, "Organization");
        assert_eq!(base.rel_type, "works_at");
        assert_eq!(base.properties.get("start_year").unwrap(), "2020");
        assert!(base.properties.get("name").is_none());
    }

    #[test]
    fn test_identity_merge_across_spacing_and_case() {
        let a = map_to_base_node(&Node::new("john doe", "person"));
        let b = map_to_base_node(&Node::new("John  Doe", "Person"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_relationship_normalization_is_idempotent() {
        let rel = Relationship::new(
            Node::new("marie curie", "PERSON").with_property("Birth Date", "1867"),
            Node::new("radium", "element"),
            "DISCOVERED",
        );

        let once = map_to_base_relationship(&rel);
        let twice = map_to_base_relationship(&Relationship::from(&once));
        assert_eq!(once, twice);
    }
}
