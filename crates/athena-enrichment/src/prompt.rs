//! Knowledge-graph extraction prompt
//!
//! The instruction block is fixed text. Allow-lists are appended to the node labeling
//! section only when non-empty; they guide the model but are never enforced on the
//! answer.

use athena_core::PromptMessage;

const OVERVIEW: &str = "# Knowledge Graph Instructions for GPT
## 1. Overview
You are a top-tier algorithm designed for extracting information from markdown notes in structured formats to build a knowledge graph.
- **Nodes** represent entities and concepts. They're akin to Wikipedia nodes.
- The aim is to achieve simplicity and clarity in the knowledge graph, making it accessible for a vast audience.
## 2. Labeling Nodes
- **Consistency**: Ensure you use basic or elementary types for node labels.
  - For example, when you identify an entity representing a person, always label it as **\"person\"**. Avoid using more specific terms like \"mathematician\" or \"scientist\".
- **Node IDs**: Never utilize integers as node IDs. Node IDs should be names or human-readable identifiers found in the text.";

const RULES: &str = "## 3. Handling Numerical Data and Dates
- Numerical data, like age or other related information, should be incorporated as attributes or properties of the respective nodes.
- **No Separate Nodes for Dates/Numbers**: Do not create separate nodes for dates or numerical values. Always attach them as attributes or properties of nodes.
- **Property Format**: Properties must be in a key-value format.
- **Quotation Marks**: Never use escaped single or double quotes within property values.
- **Naming Convention**: Use camelCase for property keys, e.g., `birthDate`.
## 4. Coreference Resolution
- **Maintain Entity Consistency**: When extracting entities, it's vital to ensure consistency.
If an entity, such as \"John Doe\", is mentioned multiple times in the text but is referred to by different names or pronouns (e.g., \"Joe\", \"he\"),
always use the most complete identifier for that entity throughout the knowledge graph. In this example, use \"John Doe\" as the entity ID.
Remember, the knowledge graph should be coherent and easily understandable, so maintaining consistency in entity references is crucial.
## 5. Strict Compliance
Adhere to the rules strictly. Non-compliance will result in termination.";

/// Prefix of the message carrying the chunk text
pub const INPUT_PREFIX: &str =
    "Use the given format to extract information from the following input: ";

/// Closing reminder sent after the input
pub const FORMAT_TIP: &str = "Tip: Make sure to answer in the correct format";

/// Render the system instruction, embedding allow-lists that are non-empty
pub fn system_instruction(allowed_nodes: &[String], allowed_rels: &[String]) -> String {
    let mut text = String::from(OVERVIEW);
    if !allowed_nodes.is_empty() {
        text.push_str("\n- **Allowed Node Labels:** ");
        text.push_str(&allowed_nodes.join(", "));
    }
    if !allowed_rels.is_empty() {
        text.push_str("\n- **Allowed Relationship Types:** ");
        text.push_str(&allowed_rels.join(", "));
    }
    text.push('\n');
    text.push_str(RULES);
    text
}

/// The three messages sent per chunk: instruction, input, format tip
///
/// The chunk text is embedded verbatim, including when empty.
pub fn extraction_messages(
    chunk_text: &str,
    allowed_nodes: &[String],
    allowed_rels: &[String],
) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(system_instruction(allowed_nodes, allowed_rels)),
        PromptMessage::user(format!("{INPUT_PREFIX}{chunk_text}")),
        PromptMessage::user(FORMAT_TIP),
    ]
}
