//! Tool routing
//!
//! ```text
//!   model tool_use ──▶ ToolInvoker ──find_owner──▶ ToolRegistry
//!                          │
//!                          └──get(owner)──▶ McpConnections ──call_tool──▶ MCP server
//! ```
//!
//! The registry records which connection exposes which tools. The invoker
//! resolves the owner, fetches its live handle and runs the call, turning
//! every failure into a `{"error": ...}` envelope.

mod registry;
mod invoker;

pub use registry::ToolRegistry;
pub use invoker::{InvokeError, InvokeResult, ToolInvoker};
