//! Configuration provider trait

use async_trait::async_trait;

use super::settings::{ChatSettings, McpServerConfig};

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: YAML file (~/.config/graphchat/config.yaml)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Get the chat settings at this level
    async fn get_settings(&self) -> ChatSettings;

    /// Replace the chat settings at this level
    async fn update_settings(&self, settings: ChatSettings) -> ConfigResult<()>;

    /// Get all configured MCP servers
    async fn get_mcp_servers(&self) -> Vec<McpServerConfig>;

    /// Add a new MCP server
    async fn add_mcp_server(&self, server: McpServerConfig) -> ConfigResult<()>;

    /// Remove an MCP server by name
    async fn remove_mcp_server(&self, name: &str) -> ConfigResult<()>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("MCP server not found: {0}")]
    ServerNotFound(String),

    #[error("MCP server already exists: {0}")]
    ServerExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
