//! Tool calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::ContentBlock;

/// Tool definition as advertised by a tool connection and sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within its connection
    pub name: String,
    /// Description of what the tool does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the input parameters
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Create a new tool descriptor with an empty object schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// Tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    /// Correlation id echoed back in the tool result
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    pub input: Value,
}

impl ToolUse {
    /// Create a new tool use
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Extract the tool use from a content block
    pub fn from_block(block: &ContentBlock) -> Option<Self> {
        match block {
            ContentBlock::ToolUse { id, name, input } => Some(Self::new(id, name, input.clone())),
            ContentBlock::Text { .. } | ContentBlock::ToolResult { .. } => None,
        }
    }

    /// Get an input argument as a string
    pub fn get_arg_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }
}

impl From<ToolUse> for ContentBlock {
    fn from(tool_use: ToolUse) -> Self {
        ContentBlock::ToolUse {
            id: tool_use.id,
            name: tool_use.name,
            input: tool_use.input,
        }
    }
}

/// Build the JSON error envelope folded back into the transcript
///
/// Rendered as `{"error": "<message>"}`, with a space after the colon.
pub fn error_envelope(message: impl std::fmt::Display) -> String {
    format!("{{\"error\": {}}}", Value::String(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_wire_shape() {
        let tool = ToolDescriptor::new("read_neo4j_cypher")
            .with_description("Run a read-only Cypher query")
            .with_schema(json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }));

        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["name"], "read_neo4j_cypher");
        assert_eq!(value["input_schema"]["required"][0], "query");
    }

    #[test]
    fn test_descriptor_without_description() {
        let value = serde_json::to_value(ToolDescriptor::new("get_schema")).unwrap();
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_tool_use_from_block() {
        let block = ContentBlock::tool_use("t1", "read_neo4j_cypher", json!({ "query": "MATCH (n) RETURN count(n)" }));
        let tool_use = ToolUse::from_block(&block).unwrap();
        assert_eq!(tool_use.id, "t1");
        assert_eq!(tool_use.get_arg_str("query"), Some("MATCH (n) RETURN count(n)"));

        assert!(ToolUse::from_block(&ContentBlock::text("hi")).is_none());
    }

    #[test]
    fn test_error_envelope() {
        let envelope = error_envelope("boom");
        let parsed: Value = serde_json::from_str(&envelope).unwrap();
        assert_eq!(parsed, json!({ "error": "boom" }));
        assert_eq!(
            error_envelope("Tool foo not found in any MCP connection"),
            r#"{"error": "Tool foo not found in any MCP connection"}"#
        );
        assert_eq!(error_envelope("say \"hi\""), r#"{"error": "say \"hi\""}"#);
    }
}
