//! Mock provider for testing
//!
//! Deterministic responses without network access. The scripted mode plays
//! back one queued turn per `stream_chat` call, which is how the chat loop is
//! driven through tool round trips in tests.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::types::{
    CancellationToken, ChatMessage, ContentBlock, MessageContent, MessageRole, StopReason,
    StreamChunk, ToolUse,
};

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Return response as specific chunks
    Chunks(Vec<String>),
    /// Simulate an error after some chunks
    Error { message: String, delay_chunks: usize },
    /// Return nothing but the end-of-message marker
    Empty,
    /// Play back queued turns, one per call
    Scripted,
}

/// Configuration for the mock provider
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub mode: MockMode,
    /// Delay between chunks in milliseconds (0 = no delay)
    pub chunk_delay_ms: u64,
    /// Size of each chunk when splitting fixed/echo responses
    pub chunk_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mode: MockMode::Echo,
            chunk_delay_ms: 0,
            chunk_size: 10,
        }
    }
}

/// One scripted model turn, streamed verbatim
#[derive(Debug, Clone, Default)]
pub struct MockTurn {
    pub chunks: Vec<StreamChunk>,
}

impl MockTurn {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain answer that ends the turn
    pub fn answer(text: impl Into<String>) -> Self {
        Self::new().text(text).stop(StopReason::EndTurn)
    }

    /// A single tool request, optionally preceded by text
    pub fn tool(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self::new().tool_use(id, name, input).stop(StopReason::ToolUse)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.chunks.push(StreamChunk::text(text));
        self
    }

    pub fn tool_use(mut self, id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        self.chunks.push(StreamChunk::tool_call(ToolUse::new(id, name, input)));
        self
    }

    pub fn stop(mut self, reason: StopReason) -> Self {
        self.chunks.push(StreamChunk::done(reason));
        self
    }
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub options: StreamChatOptions,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    config: MockConfig,
    script: Mutex<VecDeque<MockTurn>>,
    requests: Mutex<Vec<MockRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_config(MockConfig::default(), logger)
    }

    pub fn with_config(config: MockConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::new(logger)
    }

    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode: MockMode::Fixed(response.into()),
                ..Default::default()
            },
            logger,
        )
    }

    pub fn chunked(chunks: Vec<String>, delay_ms: u64, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode: MockMode::Chunks(chunks),
                chunk_delay_ms: delay_ms,
                ..Default::default()
            },
            logger,
        )
    }

    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode: MockMode::Error {
                    message: message.into(),
                    delay_chunks: 0,
                },
                ..Default::default()
            },
            logger,
        )
    }

    /// Create a provider that plays back `turns` in order
    pub fn scripted(turns: Vec<MockTurn>, logger: Arc<dyn Logger>) -> Self {
        let provider = Self::with_config(
            MockConfig {
                mode: MockMode::Scripted,
                ..Default::default()
            },
            logger,
        );
        provider.script.lock().extend(turns);
        provider
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.chunk_delay_ms = delay_ms;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Queue another scripted turn
    pub fn push_turn(&self, turn: MockTurn) {
        self.script.lock().push_back(turn);
    }

    /// Scripted turns not yet played
    pub fn remaining_turns(&self) -> usize {
        self.script.lock().len()
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    fn get_last_user_message(&self, messages: &[ChatMessage]) -> String {
        for msg in messages.iter().rev() {
            if msg.role != MessageRole::User {
                continue;
            }
            let text = match &msg.content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Blocks(blocks) => blocks
                    .iter()
                    .filter_map(ContentBlock::as_text)
                    .collect::<Vec<_>>()
                    .join(""),
                MessageContent::Empty => String::new(),
            };
            if !text.is_empty() {
                return text;
            }
        }
        "Hello from MockProvider!".to_string()
    }

    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if self.config.chunk_size == 0 || text.is_empty() {
            return vec![text.to_string()];
        }

        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.config.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }

    fn text_turn(chunks: Vec<String>) -> Vec<ProviderResult<StreamChunk>> {
        chunks
            .into_iter()
            .filter(|c| !c.is_empty())
            .map(|c| Ok(StreamChunk::text(c)))
            .chain(std::iter::once(Ok(StreamChunk::done(StopReason::EndTurn))))
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_api_base(&self) -> &str {
        "http://localhost:0/mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        self.logger.debug("[MockProvider] stream_chat called");

        let items: Vec<ProviderResult<StreamChunk>> = match &self.config.mode {
            MockMode::Echo => {
                let user_msg = self.get_last_user_message(&messages);
                Self::text_turn(self.split_into_chunks(&format!("Echo: {}", user_msg)))
            }
            MockMode::Fixed(response) => Self::text_turn(self.split_into_chunks(response)),
            MockMode::Chunks(chunks) => Self::text_turn(chunks.clone()),
            MockMode::Empty => Self::text_turn(vec![]),
            MockMode::Error { message, delay_chunks } => (0..*delay_chunks)
                .map(|i| Ok(StreamChunk::text(format!("Chunk {} before error. ", i))))
                .chain(std::iter::once(Err(ProviderError::Other(format!(
                    "Mock error: {}",
                    message
                )))))
                .collect(),
            MockMode::Scripted => {
                let turn = self.script.lock().pop_front().ok_or_else(|| {
                    ProviderError::Other("Mock script exhausted".to_string())
                })?;
                self.logger.debug(&format!(
                    "[MockProvider] Playing scripted turn with {} chunks",
                    turn.chunks.len()
                ));
                turn.chunks.into_iter().map(Ok).collect()
            }
        };

        self.requests.lock().push(MockRequest {
            messages,
            model: model.model,
            options,
        });

        let delay_ms = self.config.chunk_delay_ms;
        let stream = stream::iter(items.into_iter().enumerate()).then(move |(i, item)| {
            let cancel = cancel_token.clone();
            async move {
                if i > 0 && delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                if cancel.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }
                item
            }
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    async fn collect(provider: &MockProvider, prompt: &str, cancel: CancellationToken) -> Vec<ProviderResult<StreamChunk>> {
        let stream = provider
            .stream_chat(
                vec![ChatMessage::user(prompt)],
                ProviderModelConfig::new("mock-model"),
                StreamChatOptions::default(),
                cancel,
            )
            .await
            .expect("stream should start");
        stream.collect().await
    }

    fn text_of(items: &[ProviderResult<StreamChunk>]) -> String {
        items
            .iter()
            .filter_map(|i| i.as_ref().ok().and_then(|c| c.as_text()))
            .collect()
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let provider = MockProvider::echo(test_logger());
        let items = collect(&provider, "Hello, world!", CancellationToken::new()).await;

        assert_eq!(text_of(&items), "Echo: Hello, world!");
        assert!(matches!(
            items.last(),
            Some(Ok(StreamChunk::Done { stop_reason: StopReason::EndTurn }))
        ));
    }

    #[tokio::test]
    async fn test_chunked_mode() {
        let chunks = vec!["First ".to_string(), "second ".to_string(), "third.".to_string()];
        let provider = MockProvider::chunked(chunks.clone(), 0, test_logger());
        let items = collect(&provider, "Anything", CancellationToken::new()).await;

        let received: Vec<String> = items
            .iter()
            .filter_map(|i| i.as_ref().ok().and_then(|c| c.as_text()).map(String::from))
            .collect();
        assert_eq!(received, chunks);
    }

    #[tokio::test]
    async fn test_error_mode() {
        let provider = MockProvider::error("Test error message", test_logger());
        let items = collect(&provider, "Anything", CancellationToken::new()).await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[tokio::test]
    async fn test_scripted_turns_and_recorded_requests() {
        let provider = MockProvider::scripted(
            vec![
                MockTurn::tool("t1", "get_neo4j_schema", json!({})),
                MockTurn::answer("Done."),
            ],
            test_logger(),
        );

        let first = collect(&provider, "Describe the schema", CancellationToken::new()).await;
        assert!(first[0].as_ref().unwrap().is_tool_call());
        assert_eq!(provider.remaining_turns(), 1);

        let second = collect(&provider, "again", CancellationToken::new()).await;
        assert_eq!(text_of(&second), "Done.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].model, "mock-model");
        assert_eq!(requests[1].messages[0].text(), Some("again"));

        let result = provider
            .stream_chat(
                vec![],
                ProviderModelConfig::new("mock-model"),
                StreamChatOptions::default(),
                CancellationToken::new(),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cancellation() {
        let provider = MockProvider::fixed("Long response that should be cancelled", test_logger())
            .with_delay(20);
        let cancel = CancellationToken::new();

        let mut stream = provider
            .stream_chat(
                vec![ChatMessage::user("Anything")],
                ProviderModelConfig::new("mock-model"),
                StreamChatOptions::default(),
                cancel.clone(),
            )
            .await
            .expect("stream should start");

        assert!(matches!(stream.next().await, Some(Ok(_))));
        cancel.cancel();
        assert!(matches!(stream.next().await, Some(Err(ProviderError::Cancelled))));
    }

    #[test]
    fn test_chunk_splitting() {
        let provider = MockProvider::new(test_logger()).with_chunk_size(5);
        let chunks = provider.split_into_chunks("Hello, world!");

        assert_eq!(chunks, vec!["Hello", ", wor", "ld!"]);
    }
}
