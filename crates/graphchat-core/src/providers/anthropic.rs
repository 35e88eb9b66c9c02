//! AnthropicProvider - Messages API over SSE
//!
//! Talks to `/v1/messages` directly so the stream carries the model's own
//! `stop_reason` and tool-use blocks with their ids intact.

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::DEFAULT_MAX_TOKENS;
use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage, StopReason, StreamChunk, ToolUse};

use super::error::{ProviderError, ProviderResult};
use super::sse::{SseEvent, SseParser};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "anthropic";

pub struct AnthropicProvider {
    http: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl AnthropicProvider {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            http: reqwest::Client::new(),
            logger,
        }
    }

    /// Use a preconfigured HTTP client (proxies, timeouts)
    pub fn with_client(http: reqwest::Client, logger: Arc<dyn Logger>) -> Self {
        Self { http, logger }
    }
}

/// Build the JSON body for a streaming Messages request
///
/// Null-content transcript entries are not sent; the API rejects them.
pub fn build_request_body(messages: &[ChatMessage], model: &str, options: &StreamChatOptions) -> Value {
    let wire: Vec<&ChatMessage> = messages.iter().filter(|m| !m.is_empty()).collect();

    let mut body = json!({
        "model": model,
        "max_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "messages": wire,
        "stream": true,
    });

    if let Some(system) = &options.system {
        body["system"] = json!(system);
    }
    if let Some(temperature) = options.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(tools) = &options.tools {
        body["tools"] = json!(tools);
    }

    body
}

#[derive(Debug)]
struct PendingToolUse {
    id: String,
    name: String,
    input_json: String,
}

/// Turns Messages API stream events into `StreamChunk`s
///
/// Text deltas pass straight through. Tool input arrives as JSON fragments
/// and is emitted as one `ToolCall` when its content block stops.
#[derive(Debug, Default)]
pub struct AnthropicStreamDecoder {
    current_tool: Option<PendingToolUse>,
    stop_reason: Option<StopReason>,
    finished: bool,
}

impl AnthropicStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `message_stop` has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn decode(&mut self, event: &SseEvent) -> ProviderResult<Vec<StreamChunk>> {
        let data: Value = serde_json::from_str(&event.data)?;
        let event_type = event
            .event
            .as_deref()
            .or_else(|| data["type"].as_str())
            .unwrap_or_default();

        let mut chunks = Vec::new();
        match event_type {
            "content_block_start" => {
                let block = &data["content_block"];
                if block["type"] == "tool_use" {
                    let id = block["id"].as_str().unwrap_or_default().to_string();
                    let name = block["name"].as_str().unwrap_or_default().to_string();
                    chunks.push(StreamChunk::tool_call_delta(id.clone(), Some(name.clone()), None));
                    self.current_tool = Some(PendingToolUse {
                        id,
                        name,
                        input_json: String::new(),
                    });
                }
            }
            "content_block_delta" => {
                let delta = &data["delta"];
                match delta["type"].as_str() {
                    Some("text_delta") => {
                        if let Some(text) = delta["text"].as_str() {
                            if !text.is_empty() {
                                chunks.push(StreamChunk::text(text));
                            }
                        }
                    }
                    Some("input_json_delta") => {
                        if let (Some(tool), Some(partial)) =
                            (self.current_tool.as_mut(), delta["partial_json"].as_str())
                        {
                            tool.input_json.push_str(partial);
                            chunks.push(StreamChunk::tool_call_delta(
                                tool.id.clone(),
                                None,
                                Some(partial.to_string()),
                            ));
                        }
                    }
                    // thinking / signature deltas are not surfaced
                    _ => {}
                }
            }
            "content_block_stop" => {
                if let Some(tool) = self.current_tool.take() {
                    let input = if tool.input_json.trim().is_empty() {
                        json!({})
                    } else {
                        serde_json::from_str(&tool.input_json).map_err(|e| {
                            ProviderError::invalid_response(
                                PROVIDER,
                                format!("tool input for {} is not valid JSON: {}", tool.name, e),
                            )
                        })?
                    };
                    chunks.push(StreamChunk::tool_call(ToolUse::new(tool.id, tool.name, input)));
                }
            }
            "message_delta" => {
                if let Some(reason) = data["delta"]["stop_reason"].as_str() {
                    self.stop_reason = Some(StopReason::from(reason));
                }
            }
            "message_stop" => {
                self.finished = true;
                let reason = self.stop_reason.take().unwrap_or(StopReason::EndTurn);
                chunks.push(StreamChunk::done(reason));
            }
            "error" => {
                let error = &data["error"];
                let message = error["message"].as_str().unwrap_or("unknown error").to_string();
                let status = match error["type"].as_str() {
                    Some("overloaded_error") => 529,
                    Some("rate_limit_error") => {
                        return Err(ProviderError::rate_limited(PROVIDER, message));
                    }
                    _ => 500,
                };
                return Err(ProviderError::api_error(PROVIDER, status, message));
            }
            // message_start, ping
            _ => {}
        }

        Ok(chunks)
    }
}

struct EventStreamState {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    parser: SseParser,
    decoder: AnthropicStreamDecoder,
    pending: VecDeque<ProviderResult<StreamChunk>>,
    cancel: CancellationToken,
    logger: Arc<dyn Logger>,
    exhausted: bool,
}

impl EventStreamState {
    fn new(
        body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
        cancel: CancellationToken,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            body,
            parser: SseParser::new(),
            decoder: AnthropicStreamDecoder::new(),
            pending: VecDeque::new(),
            cancel,
            logger,
            exhausted: false,
        }
    }

    fn push_event(&mut self, event: &SseEvent) {
        if self.exhausted {
            return;
        }
        match self.decoder.decode(event) {
            Ok(chunks) => self.pending.extend(chunks.into_iter().map(Ok)),
            Err(e) => {
                self.logger.error(&format!("[AnthropicProvider] Stream error: {}", e));
                self.pending.push_back(Err(e));
                self.exhausted = true;
            }
        }
    }

    async fn next_item(mut self) -> Option<(ProviderResult<StreamChunk>, Self)> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some((item, self));
            }
            if self.exhausted {
                return None;
            }
            // A stop request must not wait for the next chunk off the socket
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                next = self.body.next() => Some(next),
            };
            let Some(next) = next else {
                self.logger.info("[AnthropicProvider] Stream cancelled");
                self.exhausted = true;
                return Some((Err(ProviderError::Cancelled), self));
            };

            match next {
                Some(Ok(bytes)) => {
                    for event in self.parser.feed(&bytes) {
                        self.push_event(&event);
                    }
                }
                Some(Err(e)) => {
                    self.logger.error(&format!("[AnthropicProvider] Body error: {}", e));
                    self.pending.push_back(Err(ProviderError::Http(e)));
                    self.exhausted = true;
                }
                None => {
                    if let Some(event) = self.parser.finish() {
                        self.push_event(&event);
                    }
                    if !self.exhausted && !self.decoder.is_finished() {
                        self.pending.push_back(Err(ProviderError::StreamEnded));
                    }
                    self.exhausted = true;
                }
            }
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn default_api_base(&self) -> &str {
        ANTHROPIC_API_BASE
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let api_key = model
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::missing_api_key(PROVIDER))?;
        let url = format!("{}/v1/messages", self.get_api_base(&model).trim_end_matches('/'));
        let body = build_request_body(&messages, &model.model, &options);

        self.logger.info(&format!(
            "[AnthropicProvider] stream_chat: model={}, messages={}, tools={}",
            model.model,
            messages.len(),
            options.tools.as_ref().map_or(0, Vec::len)
        ));

        let response = self
            .http
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            self.logger.error(&format!(
                "[AnthropicProvider] Request failed ({}): {}",
                status, text
            ));
            if status.as_u16() == 429 {
                return Err(ProviderError::rate_limited(PROVIDER, text));
            }
            return Err(ProviderError::api_error(PROVIDER, status.as_u16(), text));
        }

        let state = EventStreamState::new(
            response.bytes_stream().map(|r| r.map(|b| b.to_vec())).boxed(),
            cancel_token,
            Arc::clone(&self.logger),
        );

        Ok(Box::pin(stream::unfold(state, EventStreamState::next_item)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentBlock, MessageRole, ToolDescriptor};

    fn event(name: &str, data: Value) -> SseEvent {
        SseEvent {
            event: Some(name.to_string()),
            data: data.to_string(),
        }
    }

    fn decode_all(events: Vec<SseEvent>) -> Vec<StreamChunk> {
        let mut decoder = AnthropicStreamDecoder::new();
        events
            .iter()
            .flat_map(|e| decoder.decode(e).unwrap())
            .collect()
    }

    #[test]
    fn test_text_then_end_turn() {
        let chunks = decode_all(vec![
            event("message_start", json!({"type": "message_start", "message": {}})),
            event("content_block_start", json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}})),
            event("ping", json!({"type": "ping"})),
            event("content_block_delta", json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "There are "}})),
            event("content_block_delta", json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "42 nodes."}})),
            event("content_block_stop", json!({"type": "content_block_stop", "index": 0})),
            event("message_delta", json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}})),
            event("message_stop", json!({"type": "message_stop"})),
        ]);

        assert_eq!(
            chunks,
            vec![
                StreamChunk::text("There are "),
                StreamChunk::text("42 nodes."),
                StreamChunk::done(StopReason::EndTurn),
            ]
        );
    }

    #[test]
    fn test_tool_use_assembled_from_fragments() {
        let chunks = decode_all(vec![
            event("content_block_start", json!({"type": "content_block_start", "index": 1, "content_block": {"type": "tool_use", "id": "toolu_01", "name": "read_neo4j_cypher", "input": {}}})),
            event("content_block_delta", json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "{\"query\": \"MATCH (n) "}})),
            event("content_block_delta", json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "RETURN count(n)\"}"}})),
            event("content_block_stop", json!({"type": "content_block_stop", "index": 1})),
            event("message_delta", json!({"type": "message_delta", "delta": {"stop_reason": "tool_use"}})),
            event("message_stop", json!({"type": "message_stop"})),
        ]);

        let calls: Vec<&StreamChunk> = chunks.iter().filter(|c| c.is_tool_call()).collect();
        assert_eq!(
            calls,
            vec![&StreamChunk::tool_call(ToolUse::new(
                "toolu_01",
                "read_neo4j_cypher",
                json!({"query": "MATCH (n) RETURN count(n)"})
            ))]
        );
        assert_eq!(chunks.last(), Some(&StreamChunk::done(StopReason::ToolUse)));
    }

    #[test]
    fn test_tool_use_without_input() {
        let chunks = decode_all(vec![
            event("content_block_start", json!({"type": "content_block_start", "index": 0, "content_block": {"type": "tool_use", "id": "t1", "name": "get_neo4j_schema", "input": {}}})),
            event("content_block_stop", json!({"type": "content_block_stop", "index": 0})),
        ]);
        assert!(chunks.contains(&StreamChunk::tool_call(ToolUse::new("t1", "get_neo4j_schema", json!({})))));
    }

    #[test]
    fn test_malformed_tool_input() {
        let mut decoder = AnthropicStreamDecoder::new();
        decoder
            .decode(&event("content_block_start", json!({"type": "content_block_start", "content_block": {"type": "tool_use", "id": "t1", "name": "x"}})))
            .unwrap();
        decoder
            .decode(&event("content_block_delta", json!({"type": "content_block_delta", "delta": {"type": "input_json_delta", "partial_json": "{\"a\":"}})))
            .unwrap();
        let result = decoder.decode(&event("content_block_stop", json!({"type": "content_block_stop"})));
        assert!(matches!(result, Err(ProviderError::InvalidResponse { .. })));
    }

    #[test]
    fn test_error_event() {
        let mut decoder = AnthropicStreamDecoder::new();
        let result = decoder.decode(&event(
            "error",
            json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}),
        ));
        match result {
            Err(ProviderError::ApiError { status, message, .. }) => {
                assert_eq!(status, 529);
                assert_eq!(message, "Overloaded");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_event_type_from_data_when_unnamed() {
        let mut decoder = AnthropicStreamDecoder::new();
        let chunks = decoder
            .decode(&SseEvent {
                event: None,
                data: json!({"type": "message_stop"}).to_string(),
            })
            .unwrap();
        assert_eq!(chunks, vec![StreamChunk::done(StopReason::EndTurn)]);
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_request_body() {
        let messages = vec![
            ChatMessage::user("How many nodes?"),
            ChatMessage::assistant_answer(None),
            ChatMessage::with_blocks(
                MessageRole::Assistant,
                vec![ContentBlock::tool_use("t1", "read_neo4j_cypher", json!({"query": "RETURN 1"}))],
            ),
            ChatMessage::tool_results(vec![ContentBlock::tool_result("t1", "[{\"1\": 1}]")]),
        ];
        let options = StreamChatOptions::new()
            .with_system("You are a Neo4j expert")
            .with_tools(vec![ToolDescriptor::new("read_neo4j_cypher")]);

        let body = build_request_body(&messages, "claude-3-7-sonnet-20250219", &options);

        assert_eq!(body["model"], "claude-3-7-sonnet-20250219");
        assert_eq!(body["max_tokens"], 12024);
        assert_eq!(body["stream"], true);
        assert_eq!(body["system"], "You are a Neo4j expert");
        assert_eq!(body["tools"][0]["name"], "read_neo4j_cypher");
        // the null assistant entry is skipped
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][1]["content"][0]["type"], "tool_use");
        assert_eq!(body["messages"][2]["content"][0]["tool_use_id"], "t1");
        assert!(body.get("temperature").is_none());
    }

    fn sse_bytes(name: &str, data: Value) -> reqwest::Result<Vec<u8>> {
        Ok(format!("event: {}\ndata: {}\n\n", name, data).into_bytes())
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_body() {
        let cancel = CancellationToken::new();
        let first = stream::iter(vec![sse_bytes(
            "content_block_delta",
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hi"}}),
        )]);
        // The socket stays open with nothing more to read
        let body = first.chain(stream::pending()).boxed();
        let state = EventStreamState::new(body, cancel.clone(), Arc::new(crate::logging::NoOpLogger::new()));
        let mut chunks = Box::pin(stream::unfold(state, EventStreamState::next_item));

        let first = chunks.next().await.unwrap().unwrap();
        assert_eq!(first, StreamChunk::Text { text: "Hi".to_string() });

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let next = tokio::time::timeout(std::time::Duration::from_secs(5), chunks.next())
            .await
            .expect("stream should stop on cancel");
        assert!(matches!(next, Some(Err(ProviderError::Cancelled))));
        assert!(chunks.next().await.is_none());
    }
}
