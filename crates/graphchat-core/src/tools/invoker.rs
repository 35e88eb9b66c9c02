//! Tool invocation: route a tool-use request to the connection that owns it
//!
//! Failures never escape `invoke`. They become a JSON error envelope that is
//! fed back to the model like any other tool result.

use std::sync::Arc;
use thiserror::Error;

use crate::chat::OutputSink;
use crate::logging::Logger;
use crate::mcp::{McpConnections, McpError};
use crate::types::{error_envelope, ToolUse};

use super::registry::ToolRegistry;

/// Why a tool could not produce a result
///
/// The display strings are the messages placed in the error envelope.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// No registered connection exposes the tool
    #[error("Tool {0} not found in any MCP connection")]
    ToolNotFound(String),

    /// The owning connection is registered but has no live handle
    #[error("MCP {0} not found in any MCP connection")]
    ConnectionUnavailable(String),

    /// The tool call itself failed
    #[error("{0}")]
    Invocation(#[from] McpError),
}

pub type InvokeResult<T> = Result<T, InvokeError>;

pub struct ToolInvoker {
    registry: ToolRegistry,
    connections: McpConnections,
    logger: Arc<dyn Logger>,
}

impl ToolInvoker {
    pub fn new(registry: ToolRegistry, connections: McpConnections, logger: Arc<dyn Logger>) -> Self {
        Self {
            registry,
            connections,
            logger,
        }
    }

    /// Run a tool-use request, returning the tool output or an error envelope.
    ///
    /// The sink's current step is named after the tool and given the result.
    pub async fn invoke(&self, tool_use: &ToolUse, sink: &dyn OutputSink) -> String {
        sink.set_step_name(&tool_use.name);

        let output = match self.try_invoke(tool_use).await {
            Ok(output) => output,
            Err(e) => {
                self.logger.warn(&format!("[ToolInvoker] {}: {}", tool_use.name, e));
                error_envelope(e)
            }
        };

        sink.set_step_output(&output);
        output
    }

    /// Same lookup and call as [`invoke`](Self::invoke), with the typed error
    pub async fn try_invoke(&self, tool_use: &ToolUse) -> InvokeResult<String> {
        let owner = self
            .registry
            .find_owner(&tool_use.name)
            .ok_or_else(|| InvokeError::ToolNotFound(tool_use.name.clone()))?;

        let connection = self
            .connections
            .get(&owner)
            .ok_or_else(|| InvokeError::ConnectionUnavailable(owner.clone()))?;

        self.logger.info(&format!(
            "[ToolInvoker] Calling {} on {} (id {})",
            tool_use.name, owner, tool_use.id
        ));

        let output = connection.call_tool(&tool_use.name, tool_use.input.clone()).await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::CollectingSink;
    use crate::logging::NoOpLogger;
    use crate::mcp::testing::FakeConnection;
    use crate::types::ToolDescriptor;
    use serde_json::json;

    fn invoker_with(registry: ToolRegistry, connections: McpConnections) -> ToolInvoker {
        ToolInvoker::new(registry, connections, Arc::new(NoOpLogger::new()))
    }

    #[tokio::test]
    async fn test_unknown_tool_envelope() {
        let invoker = invoker_with(ToolRegistry::new(), McpConnections::new());
        let sink = CollectingSink::new();

        let output = invoker.invoke(&ToolUse::new("t1", "X", json!({})), &sink).await;

        assert_eq!(output, r#"{"error": "Tool X not found in any MCP connection"}"#);
        assert_eq!(sink.steps()[0].name, "X");
        assert_eq!(sink.steps()[0].output.as_deref(), Some(output.as_str()));
    }

    #[tokio::test]
    async fn test_missing_connection_envelope() {
        let registry = ToolRegistry::new();
        registry.register("neo4j-mcp", vec![ToolDescriptor::new("get_schema")]);
        let invoker = invoker_with(registry, McpConnections::new());

        let output = invoker
            .invoke(&ToolUse::new("t1", "get_schema", json!({})), &CollectingSink::new())
            .await;

        assert_eq!(output, r#"{"error": "MCP neo4j-mcp not found in any MCP connection"}"#);
    }

    #[tokio::test]
    async fn test_tool_failure_envelope() {
        let registry = ToolRegistry::new();
        registry.register("neo4j-mcp", vec![ToolDescriptor::new("write_neo4j_cypher")]);
        let connections = McpConnections::new();
        connections.insert(
            "neo4j-mcp",
            Arc::new(FakeConnection::new(&["write_neo4j_cypher"]).fail("write_neo4j_cypher", "M")),
        );
        let invoker = invoker_with(registry, connections);

        let output = invoker
            .invoke(&ToolUse::new("t1", "write_neo4j_cypher", json!({})), &CollectingSink::new())
            .await;

        assert_eq!(output, r#"{"error": "M"}"#);
    }

    #[tokio::test]
    async fn test_failed_call_envelope_has_bare_message() {
        let registry = ToolRegistry::new();
        registry.register("neo4j-mcp", vec![ToolDescriptor::new("read_neo4j_cypher")]);
        let connections = McpConnections::new();
        connections.insert(
            "neo4j-mcp",
            Arc::new(FakeConnection::new(&["read_neo4j_cypher"]).break_call("read_neo4j_cypher", "M")),
        );
        let invoker = invoker_with(registry, connections);
        let sink = CollectingSink::new();

        let output = invoker
            .invoke(&ToolUse::new("t1", "read_neo4j_cypher", json!({})), &sink)
            .await;

        assert_eq!(output, r#"{"error": "M"}"#);
        assert_eq!(sink.steps()[0].output.as_deref(), Some(r#"{"error": "M"}"#));
    }

    #[tokio::test]
    async fn test_success_routes_to_owner() {
        let registry = ToolRegistry::new();
        registry.register("other", vec![ToolDescriptor::new("ping")]);
        registry.register("neo4j-mcp", vec![ToolDescriptor::new("get_schema")]);

        let neo4j = Arc::new(FakeConnection::new(&["get_schema"]).respond("get_schema", "{\"schema\":\"...\"}"));
        let connections = McpConnections::new();
        connections.insert("other", Arc::new(FakeConnection::new(&["ping"])));
        connections.insert("neo4j-mcp", neo4j.clone());
        let invoker = invoker_with(registry, connections);

        let sink = CollectingSink::new();
        let input = json!({ "database": "neo4j" });
        let output = invoker.invoke(&ToolUse::new("t1", "get_schema", input.clone()), &sink).await;

        assert_eq!(output, "{\"schema\":\"...\"}");
        assert_eq!(neo4j.calls(), vec![("get_schema".to_string(), input)]);
        assert_eq!(sink.steps()[0].output.as_deref(), Some("{\"schema\":\"...\"}"));
    }

    #[tokio::test]
    async fn test_try_invoke_typed_errors() {
        let registry = ToolRegistry::new();
        registry.register("neo4j-mcp", vec![ToolDescriptor::new("get_schema")]);
        let invoker = invoker_with(registry, McpConnections::new());

        let err = invoker.try_invoke(&ToolUse::new("t1", "nope", json!({}))).await.unwrap_err();
        assert!(matches!(err, InvokeError::ToolNotFound(ref name) if name == "nope"));

        let err = invoker
            .try_invoke(&ToolUse::new("t2", "get_schema", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::ConnectionUnavailable(ref owner) if owner == "neo4j-mcp"));
    }
}
