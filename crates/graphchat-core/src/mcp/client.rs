//! MCP Client using the official rmcp SDK
//!
//! Connects to MCP servers over HTTP (Streamable HTTP) or a Unix socket.

#[cfg(unix)]
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation, Tool},
    service::RunningService,
    RoleClient,
};
use serde_json::Value;

#[cfg(unix)]
use tokio::net::UnixStream;

use crate::config::{McpServerConfig, McpTransport};
use crate::logging::Logger;
use crate::types::ToolDescriptor;

use super::connection::ToolConnection;
use super::error::{McpError, McpResult};

/// MCP client for one tool server
pub struct McpClient {
    client: RunningService<RoleClient, ClientInfo>,
    logger: Arc<dyn Logger>,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "graphchat-core".to_string(),
            title: Some("GraphChat".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

impl McpClient {
    /// Connect using a configured server entry
    pub async fn connect(config: &McpServerConfig, logger: Arc<dyn Logger>) -> McpResult<Self> {
        match &config.transport {
            McpTransport::Http { url } => Self::connect_http(url, logger).await,
            #[cfg(unix)]
            McpTransport::Unix { path } => Self::connect_unix(path, logger).await,
            #[cfg(not(unix))]
            McpTransport::Unix { .. } => Err(McpError::ConnectionFailed(
                "Unix sockets are not supported on this platform".to_string(),
            )),
        }
    }

    /// Connect to an MCP server over a Unix socket
    #[cfg(unix)]
    pub async fn connect_unix<P: AsRef<Path>>(
        socket_path: P,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        let path = socket_path.as_ref();
        logger.info(&format!("[McpClient] Connecting to Unix socket: {:?}", path));

        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let client = client_info()
            .serve(stream)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self { client, logger })
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(url: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        use rmcp::transport::StreamableHttpClientTransport;

        logger.info(&format!("[McpClient] Connecting to HTTP: {}", url));

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info("[McpClient] Connected and initialized successfully");

        Ok(Self { client, logger })
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }
}

#[async_trait]
impl ToolConnection for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>> {
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!("[McpClient] Listed {} tools", result.tools.len()));

        Ok(result.tools.iter().map(to_descriptor).collect())
    }

    async fn call_tool(&self, name: &str, input: Value) -> McpResult<String> {
        self.logger.info(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: input.as_object().cloned(),
            task: None,
        };

        let result = self
            .client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))?;

        let rendered = render_tool_result(&result);
        if result.is_error.unwrap_or(false) {
            self.logger.warn(&format!("[McpClient] Tool {} reported an error", name));
            return Err(McpError::ToolError(rendered));
        }
        Ok(rendered)
    }
}

/// Convert an rmcp tool into the descriptor sent to the model
pub fn to_descriptor(tool: &Tool) -> ToolDescriptor {
    let mut descriptor = ToolDescriptor::new(tool.name.to_string())
        .with_schema(Value::Object((*tool.input_schema).clone()));
    if let Some(description) = &tool.description {
        descriptor = descriptor.with_description(description.to_string());
    }
    descriptor
}

/// Render a tool result as the string folded into the transcript
///
/// Text parts are joined with newlines. A result with no text falls back to
/// its structured content, then to the JSON of the whole result.
pub fn render_tool_result(result: &CallToolResult) -> String {
    let texts: Vec<&str> = result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.as_str()))
        .collect();

    if !texts.is_empty() {
        return texts.join("\n");
    }
    if let Some(structured) = &result.structured_content {
        return structured.to_string();
    }
    serde_json::to_string(result).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;
    use serde_json::json;

    #[test]
    fn test_render_joins_text_parts() {
        let result = CallToolResult::success(vec![
            Content::text("[{\"count\": 42}]"),
            Content::text("1 row"),
        ]);
        assert_eq!(render_tool_result(&result), "[{\"count\": 42}]\n1 row");
    }

    #[test]
    fn test_render_without_text_falls_back_to_json() {
        let result = CallToolResult::success(vec![]);
        let rendered = render_tool_result(&result);
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert!(parsed.is_object());
    }

    #[test]
    fn test_descriptor_conversion() {
        let schema = json!({
            "type": "object",
            "properties": { "query": { "type": "string" } }
        });
        let tool = Tool::new(
            "read_neo4j_cypher",
            "Execute a read Cypher query",
            Arc::new(schema.as_object().cloned().unwrap_or_default()),
        );

        let descriptor = to_descriptor(&tool);
        assert_eq!(descriptor.name, "read_neo4j_cypher");
        assert_eq!(descriptor.description.as_deref(), Some("Execute a read Cypher query"));
        assert_eq!(descriptor.input_schema, schema);
    }
}
