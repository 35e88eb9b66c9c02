//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::settings::{ChatSettings, McpServerConfig};
use super::traits::{ConfigError, ConfigProvider, ConfigResult};

/// In-memory configuration provider for testing and embedding
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    settings: RwLock<ChatSettings>,
    servers: RwLock<Vec<McpServerConfig>>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ChatSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            servers: RwLock::new(Vec::new()),
        }
    }

    pub fn with_servers(mut self, servers: Vec<McpServerConfig>) -> Self {
        self.servers = RwLock::new(servers);
        self
    }

    pub fn clear(&self) {
        *self.settings.write() = ChatSettings::default();
        self.servers.write().clear();
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn get_settings(&self) -> ChatSettings {
        self.settings.read().clone()
    }

    async fn update_settings(&self, settings: ChatSettings) -> ConfigResult<()> {
        *self.settings.write() = settings;
        Ok(())
    }

    async fn get_mcp_servers(&self) -> Vec<McpServerConfig> {
        self.servers.read().clone()
    }

    async fn add_mcp_server(&self, server: McpServerConfig) -> ConfigResult<()> {
        let mut servers = self.servers.write();
        if servers.iter().any(|s| s.name == server.name) {
            return Err(ConfigError::ServerExists(server.name));
        }
        servers.push(server);
        Ok(())
    }

    async fn remove_mcp_server(&self, name: &str) -> ConfigResult<()> {
        let mut servers = self.servers.write();
        let original_len = servers.len();
        servers.retain(|s| s.name != name);

        if servers.len() == original_len {
            Err(ConfigError::ServerNotFound(name.to_string()))
        } else {
            Ok(())
        }
    }
}
