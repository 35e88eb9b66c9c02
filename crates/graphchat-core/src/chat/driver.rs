//! Model conversation driver: one streamed model call per `converse`

use futures::StreamExt;
use std::sync::Arc;

use crate::config::ResolvedSettings;
use crate::logging::Logger;
use crate::providers::{Provider, ProviderModelConfig, ProviderResult, StreamChatOptions};
use crate::types::{
    CancellationToken, ChatMessage, ContentBlock, ModelResponse, StopReason, StreamChunk,
    ToolDescriptor,
};

use super::prompt::SYSTEM_PROMPT;
use super::sink::OutputSink;
use crate::config::DEFAULT_MAX_TOKENS;

/// Sends the transcript to the model and assembles its response
pub struct ConversationDriver {
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    system_prompt: String,
    max_tokens: u32,
    cancel_token: CancellationToken,
    logger: Arc<dyn Logger>,
}

impl ConversationDriver {
    pub fn new(provider: Arc<dyn Provider>, model: ProviderModelConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider,
            model,
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            cancel_token: CancellationToken::new(),
            logger,
        }
    }

    /// Build a driver from resolved settings and an optional API key
    pub fn from_settings(
        provider: Arc<dyn Provider>,
        settings: &ResolvedSettings,
        api_key: Option<String>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let mut model = ProviderModelConfig::new(settings.model.clone());
        model.api_key = api_key;
        model.api_base = settings.api_base.clone();

        Self::new(provider, model, logger)
            .with_system_prompt(settings.system_prompt.clone())
            .with_max_tokens(settings.max_tokens)
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub fn model(&self) -> &str {
        &self.model.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Stream one model response.
    ///
    /// Text fragments go to `sink.write` as they arrive; `sink.finish` is called
    /// once the stream completes. The response is returned as received, its stop
    /// reason uninterpreted.
    pub async fn converse(
        &self,
        transcript: &[ChatMessage],
        tools: &[ToolDescriptor],
        sink: &dyn OutputSink,
    ) -> ProviderResult<ModelResponse> {
        let options = StreamChatOptions::new()
            .with_system(self.system_prompt.clone())
            .with_max_tokens(self.max_tokens)
            .with_tools(tools.to_vec());

        self.logger.debug(&format!(
            "[ConversationDriver] Sending {} messages, {} tools to {}",
            transcript.len(),
            tools.len(),
            self.provider.name()
        ));

        let mut stream = self
            .provider
            .stream_chat(
                transcript.to_vec(),
                self.model.clone(),
                options,
                self.cancel_token.clone(),
            )
            .await?;

        let mut assembler = ResponseAssembler::default();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let StreamChunk::Text { text } = &chunk {
                sink.write(text);
            }
            assembler.push(chunk);
        }
        sink.finish();

        let response = assembler.finish();
        self.logger.info(&format!(
            "[ConversationDriver] Response: stop_reason={}, blocks={}",
            response.stop_reason,
            response.content.len()
        ));
        Ok(response)
    }
}

/// Accumulates stream chunks into content blocks in arrival order
#[derive(Debug, Default)]
struct ResponseAssembler {
    content: Vec<ContentBlock>,
    stop_reason: Option<StopReason>,
}

impl ResponseAssembler {
    fn push(&mut self, chunk: StreamChunk) {
        match chunk {
            StreamChunk::Text { text } => match self.content.last_mut() {
                Some(ContentBlock::Text { text: current }) => current.push_str(&text),
                _ => self.content.push(ContentBlock::text(text)),
            },
            StreamChunk::ToolCall { tool_call } => self.content.push(tool_call.into()),
            // Complete calls follow as ToolCall
            StreamChunk::ToolCallDelta { .. } => {}
            StreamChunk::Done { stop_reason } => self.stop_reason = Some(stop_reason),
        }
    }

    fn finish(self) -> ModelResponse {
        let stop_reason = self.stop_reason.unwrap_or_else(|| {
            if self.content.iter().any(ContentBlock::is_tool_use) {
                StopReason::ToolUse
            } else {
                StopReason::EndTurn
            }
        });
        ModelResponse::new(stop_reason, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::CollectingSink;
    use crate::logging::NoOpLogger;
    use crate::providers::{MockProvider, MockTurn, ProviderError};
    use serde_json::json;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn driver(provider: Arc<MockProvider>) -> ConversationDriver {
        ConversationDriver::new(provider, ProviderModelConfig::new("claude-3-7-sonnet-20250219"), logger())
    }

    #[tokio::test]
    async fn test_streams_text_and_returns_blocks() {
        let provider = Arc::new(MockProvider::scripted(
            vec![MockTurn::new()
                .text("Let me check ")
                .text("the schema.")
                .tool_use("t1", "get_schema", json!({}))
                .stop(StopReason::ToolUse)],
            logger(),
        ));
        let sink = CollectingSink::new();

        let response = driver(provider)
            .converse(&[ChatMessage::user("Describe the graph")], &[], &sink)
            .await
            .unwrap();

        assert_eq!(sink.fragments(), vec!["Let me check ", "the schema."]);
        assert_eq!(sink.messages(), vec!["Let me check the schema."]);
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(
            response.content,
            vec![
                ContentBlock::text("Let me check the schema."),
                ContentBlock::tool_use("t1", "get_schema", json!({})),
            ]
        );
    }

    #[tokio::test]
    async fn test_sends_settings_and_tools() {
        let provider = Arc::new(MockProvider::scripted(vec![MockTurn::answer("ok")], logger()));
        let tools = vec![ToolDescriptor::new("get_schema"), ToolDescriptor::new("read_neo4j_cypher")];

        driver(Arc::clone(&provider))
            .converse(&[ChatMessage::user("hi")], &tools, &CollectingSink::new())
            .await
            .unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.model, "claude-3-7-sonnet-20250219");
        assert_eq!(request.options.max_tokens, Some(12024));
        assert_eq!(request.options.system.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(request.options.tools.as_ref().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_stop_reason_fallbacks() {
        let provider = Arc::new(MockProvider::scripted(
            vec![
                MockTurn::new().tool_use("t1", "get_schema", json!({})),
                MockTurn::new().text("plain"),
                MockTurn::new().text("cut off").stop(StopReason::MaxTokens),
            ],
            logger(),
        ));
        let driver = driver(provider);
        let sink = CollectingSink::new();

        let first = driver.converse(&[], &[], &sink).await.unwrap();
        assert_eq!(first.stop_reason, StopReason::ToolUse);

        let second = driver.converse(&[], &[], &sink).await.unwrap();
        assert_eq!(second.stop_reason, StopReason::EndTurn);

        let third = driver.converse(&[], &[], &sink).await.unwrap();
        assert_eq!(third.stop_reason, StopReason::MaxTokens);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(MockProvider::error("overloaded", logger()));
        let result = driver(provider)
            .converse(&[ChatMessage::user("hi")], &[], &CollectingSink::new())
            .await;
        assert!(matches!(result, Err(ProviderError::Other(_))));
    }

    #[test]
    fn test_from_settings() {
        let settings = ResolvedSettings::default();
        let driver = ConversationDriver::from_settings(
            Arc::new(MockProvider::new(logger())),
            &settings,
            Some("sk-test".to_string()),
            logger(),
        );
        assert_eq!(driver.model(), "claude-3-7-sonnet-20250219");
        assert_eq!(driver.provider_name(), "mock");
        assert_eq!(driver.model.api_key.as_deref(), Some("sk-test"));
        assert_eq!(driver.max_tokens, 12024);
    }
}
