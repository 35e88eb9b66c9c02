//! GraphChat Core
//!
//! Chat backend that lets a language model answer questions about a graph
//! database by calling tools served over MCP.
//! This crate provides the core functionality that can be used from any environment
//! (Python via PyO3, native CLI, etc.)
//!
//! ## Message Loop
//!
//! The `chat` module drives one user turn: the model is called, any tool it
//! asks for is routed to the MCP connection that owns it, and the result is
//! fed back until the model produces a final answer.
//!
//! ```rust,ignore
//! use graphchat_core::{ChatSession, CollectingSink, McpServerConfig};
//!
//! let mut session = ChatSession::new(driver, logger);
//! session.connect_server(&McpServerConfig::http("neo4j-mcp", "http://localhost:8000/mcp/")).await?;
//!
//! let sink = CollectingSink::new();
//! let answer = session.on_user_message("Which labels exist?", &sink).await?;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod tools;
pub mod mcp;
pub mod chat;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentBlock, MessageRole, MessageContent,
    ToolDescriptor, ToolUse, error_envelope,
    ModelResponse, StopReason, StreamChunk,
    CancellationToken,
};

pub use secrets::{
    SecretStore, SecretInfo, SecretStoreError, SecretStoreResult,
    EnvSecretStore, MemorySecretStore, ChainSecretStore, KeychainSecretStore,
    default_secret_store,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, FileLogger};

pub use config::{
    ConfigProvider, MemoryConfigProvider, FileConfigProvider,
    ChatSettings, ResolvedSettings, ToolUsePolicy, McpServerConfig, McpTransport,
};

pub use providers::{Provider, ProviderError, ProviderResult, create_provider};

pub use tools::{ToolRegistry, ToolInvoker, InvokeError};

// MCP client using official rmcp SDK
pub use mcp::{McpClient, McpConnections, McpError, McpResult, ToolConnection};

pub use chat::{
    ChatSession, ChatError, ChatResult, ConversationDriver,
    OutputSink, CollectingSink, NullSink,
};
