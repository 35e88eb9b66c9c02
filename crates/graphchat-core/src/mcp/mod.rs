//! MCP (Model Context Protocol) connections
//!
//! Uses the official rmcp SDK to connect to tool servers over HTTP or a Unix
//! socket. The chat loop only sees the `ToolConnection` trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use graphchat_core::mcp::{McpClient, ToolConnection};
//! use std::sync::Arc;
//!
//! let client = McpClient::connect_http("http://localhost:8000/mcp/", logger).await?;
//! let tools = client.list_tools().await?;
//! let rows = client.call_tool("read_neo4j_cypher", json!({
//!     "query": "MATCH (n) RETURN count(n)"
//! })).await?;
//! ```

mod error;
mod client;
mod connection;

pub use error::{McpError, McpResult};
pub use client::{McpClient, render_tool_result, to_descriptor};
pub use connection::{McpConnections, ToolConnection};

#[cfg(test)]
pub(crate) use connection::testing;
