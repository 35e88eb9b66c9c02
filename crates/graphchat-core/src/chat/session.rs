//! Chat session: the per-conversation transcript and the tool-use loop

use std::sync::Arc;

use crate::config::{McpServerConfig, ResolvedSettings, ToolUsePolicy};
use crate::logging::Logger;
use crate::mcp::{McpClient, McpConnections, ToolConnection};
use crate::providers::create_provider;
use crate::secrets::SecretStore;
use crate::tools::{ToolInvoker, ToolRegistry};
use crate::types::{CancellationToken, ChatMessage, ContentBlock, MessageRole, ModelResponse, ToolUse};

use super::driver::ConversationDriver;
use super::error::{ChatError, ChatResult};
use super::sink::OutputSink;

/// One conversation: transcript, registered tools and live connections
///
/// `on_user_message` takes `&mut self`, so a session runs one turn at a time.
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    registry: ToolRegistry,
    connections: McpConnections,
    invoker: ToolInvoker,
    driver: ConversationDriver,
    policy: ToolUsePolicy,
    logger: Arc<dyn Logger>,
}

impl ChatSession {
    pub fn new(driver: ConversationDriver, logger: Arc<dyn Logger>) -> Self {
        let registry = ToolRegistry::new();
        let connections = McpConnections::new();
        let invoker = ToolInvoker::new(registry.clone(), connections.clone(), Arc::clone(&logger));

        Self {
            transcript: Vec::new(),
            registry,
            connections,
            invoker,
            driver,
            policy: ToolUsePolicy::default(),
            logger,
        }
    }

    /// Build a session for the configured provider, taking its API key from `secrets`
    pub fn from_settings(
        settings: &ResolvedSettings,
        secrets: &dyn SecretStore,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let provider = create_provider(&settings.provider, Arc::clone(&logger));
        let api_key = secrets.get(&settings.provider);
        if api_key.is_none() {
            logger.warn(&format!(
                "[ChatSession] No API key found for provider {}",
                settings.provider
            ));
        }

        let driver = ConversationDriver::from_settings(provider, settings, api_key, Arc::clone(&logger));
        Self::new(driver, logger).with_policy(settings.tool_use_policy)
    }

    pub fn with_policy(mut self, policy: ToolUsePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ToolUsePolicy {
        self.policy
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn connections(&self) -> &McpConnections {
        &self.connections
    }

    /// Token that stops the model call in flight
    pub fn cancel_token(&self) -> CancellationToken {
        self.driver.cancel_token().clone()
    }

    /// Forget the conversation; connections and tools stay
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Register a live connection and the tools it lists.
    ///
    /// Returns the number of tools registered. A connection with the same name
    /// is replaced.
    pub async fn connect(
        &self,
        name: impl Into<String>,
        connection: Arc<dyn ToolConnection>,
    ) -> ChatResult<usize> {
        let name = name.into();
        let tools = connection
            .list_tools()
            .await
            .map_err(|source| ChatError::Connection {
                name: name.clone(),
                source,
            })?;

        let count = tools.len();
        self.registry.register(name.clone(), tools);
        self.connections.insert(name.clone(), connection);

        self.logger.info(&format!("[ChatSession] Connected {} ({} tools)", name, count));
        Ok(count)
    }

    /// Open an MCP client for a configured server and register it
    pub async fn connect_server(&self, server: &McpServerConfig) -> ChatResult<usize> {
        let client = McpClient::connect(server, Arc::clone(&self.logger))
            .await
            .map_err(|source| ChatError::Connection {
                name: server.name.clone(),
                source,
            })?;
        self.connect(server.name.clone(), Arc::new(client)).await
    }

    /// Drop a connection and its tools. Returns whether it existed.
    pub fn disconnect(&self, name: &str) -> bool {
        let had_tools = self.registry.unregister(name).is_some();
        let had_handle = self.connections.remove(name).is_some();
        if had_tools || had_handle {
            self.logger.info(&format!("[ChatSession] Disconnected {}", name));
        }
        had_tools || had_handle
    }

    /// Run one user turn to completion.
    ///
    /// Alternates between the model and tools until the model stops asking
    /// for a tool, then appends the first text block of the final response
    /// (or a null message if it has none) and returns it.
    pub async fn on_user_message(
        &mut self,
        text: impl Into<String>,
        sink: &dyn OutputSink,
    ) -> ChatResult<Option<String>> {
        self.driver.cancel_token().reset();
        self.transcript.push(ChatMessage::user(text));

        let mut response = self.call_model(sink).await?;

        while response.wants_tool() {
            let requests = self.select_tool_uses(&response);
            if requests.is_empty() {
                self.logger.warn("[ChatSession] stop_reason is tool_use but no tool_use block; ending turn");
                break;
            }

            let mut results = Vec::with_capacity(requests.len());
            for tool_use in &requests {
                let output = self.invoker.invoke(tool_use, sink).await;
                results.push(ContentBlock::tool_result(tool_use.id.clone(), output));
            }

            self.transcript
                .push(ChatMessage::with_blocks(MessageRole::Assistant, response.content));
            self.transcript.push(ChatMessage::tool_results(results));

            response = self.call_model(sink).await?;
        }

        let answer = response.first_text().map(str::to_string);
        self.transcript.push(ChatMessage::assistant_answer(answer.clone()));
        Ok(answer)
    }

    async fn call_model(&self, sink: &dyn OutputSink) -> ChatResult<ModelResponse> {
        let tools = self.registry.all_tools();
        Ok(self.driver.converse(&self.transcript, &tools, sink).await?)
    }

    fn select_tool_uses(&self, response: &ModelResponse) -> Vec<ToolUse> {
        match self.policy {
            ToolUsePolicy::FirstOnly => response.first_tool_use().into_iter().collect(),
            ToolUsePolicy::All => response.tool_uses(),
        }
    }
}
