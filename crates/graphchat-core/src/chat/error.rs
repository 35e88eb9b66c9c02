//! Chat loop errors

use thiserror::Error;

use crate::mcp::McpError;
use crate::providers::ProviderError;

/// Errors that end a chat turn or a connection attempt
///
/// Tool failures are not here: they are folded into the transcript.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The model call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Connecting to or listing a tool server failed
    #[error("MCP {name}: {source}")]
    Connection {
        name: String,
        #[source]
        source: McpError,
    },
}

pub type ChatResult<T> = Result<T, ChatError>;
