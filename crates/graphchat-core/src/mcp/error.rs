//! MCP error types

use thiserror::Error;

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// The request never produced a tool result (transport or protocol
    /// failure). Displays the underlying message.
    #[error("{0}")]
    ToolCallFailed(String),

    /// The server ran the tool and flagged the result as an error.
    /// Displays the tool's own message.
    #[error("{0}")]
    ToolError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;
