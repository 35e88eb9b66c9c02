//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/graphchat/config.yaml) and workspace-level
//! (.config/graphchat/config.yaml) config.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{ChatSettings, McpServerConfig};
use super::traits::{ConfigError, ConfigProvider, ConfigResult};

/// Configuration file structure
///
/// ```yaml
/// settings:
///   model: claude-3-7-sonnet-20250219
///   tool_use_policy: first_only
/// mcp_servers:
///   - name: neo4j-mcp
///     transport: http
///     url: http://localhost:8000/mcp/
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: ChatSettings,

    #[serde(default)]
    pub mcp_servers: Vec<McpServerConfig>,
}

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/graphchat/config.yaml)
    User,
    /// Workspace-level config (.config/graphchat/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// File-based configuration provider
///
/// # Example
///
/// ```no_run
/// use graphchat_core::config::FileConfigProvider;
///
/// let user_config = FileConfigProvider::user();
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider (~/.config/graphchat/config.yaml)
    pub fn user() -> Self {
        // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        let path = config_dir.join("graphchat").join("config.yaml");
        Self::new(path, ConfigLevel::User)
    }

    /// Create a workspace-level config provider (.config/graphchat/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root.as_ref().join(".config").join("graphchat").join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    /// Get cached or load config
    pub fn get_config(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }

        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Create a backup of the current config file
    pub fn backup(&self) -> ConfigResult<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }

        let backup_path = self.path.with_extension("yaml.backup");
        fs::copy(&self.path, &backup_path)?;
        Ok(Some(backup_path))
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn get_settings(&self) -> ChatSettings {
        self.get_config().map(|c| c.settings).unwrap_or_default()
    }

    async fn update_settings(&self, settings: ChatSettings) -> ConfigResult<()> {
        let mut config = self.get_config()?;
        config.settings = settings;
        self.save(&config)
    }

    async fn get_mcp_servers(&self) -> Vec<McpServerConfig> {
        self.get_config().map(|c| c.mcp_servers).unwrap_or_default()
    }

    async fn add_mcp_server(&self, server: McpServerConfig) -> ConfigResult<()> {
        let mut config = self.get_config()?;
        if config.mcp_servers.iter().any(|s| s.name == server.name) {
            return Err(ConfigError::ServerExists(server.name));
        }

        config.mcp_servers.push(server);
        self.save(&config)
    }

    async fn remove_mcp_server(&self, name: &str) -> ConfigResult<()> {
        let mut config = self.get_config()?;
        let original_len = config.mcp_servers.len();
        config.mcp_servers.retain(|s| s.name != name);

        if config.mcp_servers.len() == original_len {
            Err(ConfigError::ServerNotFound(name.to_string()))
        } else {
            self.save(&config)
        }
    }
}
