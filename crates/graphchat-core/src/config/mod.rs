//! Configuration provider abstractions
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: YAML file-based (user/workspace level)
//!
//! Settings layer: workspace over user over built-in defaults.

mod traits;
mod settings;
mod memory;
mod file;

pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use settings::{
    ChatSettings, ResolvedSettings, ToolUsePolicy, McpServerConfig, McpTransport,
    DEFAULT_PROVIDER, DEFAULT_MODEL, DEFAULT_MAX_TOKENS,
};
pub use memory::MemoryConfigProvider;
pub use file::{FileConfigProvider, ConfigFile, ConfigLevel};

/// Combine config levels, later providers overriding earlier ones
///
/// Settings merge field by field. MCP servers are unioned by name; a later
/// level's entry replaces an earlier one in place.
pub async fn load_layered(levels: &[&dyn ConfigProvider]) -> ConfigFile {
    let mut merged = ConfigFile::default();

    for level in levels {
        merged.settings = merged.settings.merge(&level.get_settings().await);

        for server in level.get_mcp_servers().await {
            match merged.mcp_servers.iter_mut().find(|s| s.name == server.name) {
                Some(existing) => *existing = server,
                None => merged.mcp_servers.push(server),
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_workspace_overrides_user() {
        let user = MemoryConfigProvider::with_settings(
            ChatSettings::new().with_provider("openai").with_model("gpt-4o"),
        )
        .with_servers(vec![
            McpServerConfig::http("neo4j-mcp", "http://user-host/mcp/"),
            McpServerConfig::http("memory", "http://localhost:9000/mcp/"),
        ]);
        let workspace = MemoryConfigProvider::with_settings(ChatSettings::new().with_model("gpt-4o-mini"))
            .with_servers(vec![McpServerConfig::unix("neo4j-mcp", "/tmp/neo4j.sock")]);

        let merged = load_layered(&[&user, &workspace]).await;

        let resolved = merged.settings.resolve();
        assert_eq!(resolved.provider, "openai");
        assert_eq!(resolved.model, "gpt-4o-mini");
        assert_eq!(resolved.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(
            merged.mcp_servers,
            vec![
                McpServerConfig::unix("neo4j-mcp", "/tmp/neo4j.sock"),
                McpServerConfig::http("memory", "http://localhost:9000/mcp/"),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_levels_gives_defaults() {
        let merged = load_layered(&[]).await;
        assert_eq!(merged, ConfigFile::default());
        assert_eq!(merged.settings.resolve().model, DEFAULT_MODEL);
    }
}
