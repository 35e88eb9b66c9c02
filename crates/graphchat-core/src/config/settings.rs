//! Chat settings and MCP server entries

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chat::SYSTEM_PROMPT;

pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const DEFAULT_MAX_TOKENS: u32 = 12024;

/// Which tool-use blocks of a response get executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolUsePolicy {
    /// Only the first tool-use block; the rest stay in the transcript unanswered
    #[default]
    FirstOnly,
    /// Every tool-use block, sequentially, in order
    All,
}

/// Chat settings as written in a config file; every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use_policy: Option<ToolUsePolicy>,
}

impl ChatSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tool_use_policy(mut self, policy: ToolUsePolicy) -> Self {
        self.tool_use_policy = Some(policy);
        self
    }

    /// Layer `other` on top of `self`; fields set in `other` win
    pub fn merge(&self, other: &ChatSettings) -> ChatSettings {
        ChatSettings {
            provider: other.provider.clone().or_else(|| self.provider.clone()),
            model: other.model.clone().or_else(|| self.model.clone()),
            max_tokens: other.max_tokens.or(self.max_tokens),
            api_base: other.api_base.clone().or_else(|| self.api_base.clone()),
            system_prompt: other.system_prompt.clone().or_else(|| self.system_prompt.clone()),
            tool_use_policy: other.tool_use_policy.or(self.tool_use_policy),
        }
    }

    /// Fill every unset field with its default
    pub fn resolve(&self) -> ResolvedSettings {
        ResolvedSettings {
            provider: self.provider.clone().unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            model: self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            api_base: self.api_base.clone(),
            system_prompt: self.system_prompt.clone().unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
            tool_use_policy: self.tool_use_policy.unwrap_or_default(),
        }
    }
}

/// Settings with defaults applied, as used by a chat session
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_base: Option<String>,
    pub system_prompt: String,
    pub tool_use_policy: ToolUsePolicy,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        ChatSettings::default().resolve()
    }
}

/// How to reach an MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum McpTransport {
    /// Streamable HTTP endpoint
    Http { url: String },
    /// Unix domain socket
    Unix { path: PathBuf },
}

/// A named MCP server entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Connection name; tools are registered under it
    pub name: String,
    #[serde(flatten)]
    pub transport: McpTransport,
}

impl McpServerConfig {
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: McpTransport::Http { url: url.into() },
        }
    }

    pub fn unix(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            transport: McpTransport::Unix { path: path.into() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let resolved = ChatSettings::default().resolve();
        assert_eq!(resolved.provider, "anthropic");
        assert_eq!(resolved.model, "claude-3-7-sonnet-20250219");
        assert_eq!(resolved.max_tokens, 12024);
        assert_eq!(resolved.tool_use_policy, ToolUsePolicy::FirstOnly);
        assert_eq!(resolved.system_prompt, SYSTEM_PROMPT);
        assert!(resolved.api_base.is_none());
    }

    #[test]
    fn test_merge_overrides_only_set_fields() {
        let user = ChatSettings::new()
            .with_provider("openai")
            .with_model("gpt-4o")
            .with_max_tokens(4096);
        let workspace = ChatSettings::new()
            .with_model("gpt-4o-mini")
            .with_tool_use_policy(ToolUsePolicy::All);

        let merged = user.merge(&workspace);
        assert_eq!(merged.provider.as_deref(), Some("openai"));
        assert_eq!(merged.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(merged.max_tokens, Some(4096));
        assert_eq!(merged.tool_use_policy, Some(ToolUsePolicy::All));
    }

    #[test]
    fn test_server_yaml_shape() {
        let yaml = "\
- name: neo4j-mcp
  transport: http
  url: http://localhost:8000/mcp/
- name: local
  transport: unix
  path: /tmp/mcp.sock
";
        let servers: Vec<McpServerConfig> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            servers,
            vec![
                McpServerConfig::http("neo4j-mcp", "http://localhost:8000/mcp/"),
                McpServerConfig::unix("local", "/tmp/mcp.sock"),
            ]
        );
    }

    #[test]
    fn test_policy_names() {
        let policy: ToolUsePolicy = serde_yaml::from_str("first_only").unwrap();
        assert_eq!(policy, ToolUsePolicy::FirstOnly);
        let policy: ToolUsePolicy = serde_yaml::from_str("all").unwrap();
        assert_eq!(policy, ToolUsePolicy::All);
    }
}
