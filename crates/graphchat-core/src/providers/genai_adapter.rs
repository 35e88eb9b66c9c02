//! Adapter between graphchat-core types and genai types
//!
//! Transcript entries are block-structured (Anthropic shape). genai models tool
//! calls and tool responses as their own messages, so one of our messages may
//! expand into several genai messages.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatStreamEvent,
    Tool as GenaiTool, ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::json;

use crate::logging::file_logger as file_log;
use crate::types::{
    ChatMessage, ContentBlock, MessageContent, MessageRole, StopReason, StreamChunk,
    ToolDescriptor, ToolUse,
};

use super::error::ProviderError;
use super::traits::StreamChatOptions;

// ============================================================================
// Message Conversion: graphchat -> genai
// ============================================================================

/// Convert one transcript entry into the genai messages that represent it
pub fn to_genai_message(msg: ChatMessage) -> Vec<GenaiMessage> {
    let role = msg.role;
    match msg.content {
        MessageContent::Empty => vec![],
        MessageContent::Text(text) if text.is_empty() => vec![],
        MessageContent::Text(text) => vec![match role {
            MessageRole::User => GenaiMessage::user(text),
            MessageRole::Assistant => GenaiMessage::assistant(text),
        }],
        MessageContent::Blocks(blocks) => match role {
            MessageRole::Assistant => assistant_blocks(blocks),
            MessageRole::User => user_blocks(blocks),
        },
    }
}

fn assistant_blocks(blocks: Vec<ContentBlock>) -> Vec<GenaiMessage> {
    let mut text = Vec::new();
    let mut calls = Vec::new();
    for block in blocks {
        match block {
            ContentBlock::Text { text: t } => text.push(t),
            ContentBlock::ToolUse { id, name, input } => {
                match to_genai_tool_call(&ToolUse::new(id, name, input)) {
                    Ok(call) => calls.push(call),
                    Err(e) => file_log::warn("genai_adapter", &format!("Dropping tool call: {}", e)),
                }
            }
            // tool results never appear on the assistant side
            ContentBlock::ToolResult { .. } => {}
        }
    }

    let mut out = Vec::new();
    let text = text.join("\n");
    if !text.is_empty() {
        out.push(GenaiMessage::assistant(text));
    }
    if !calls.is_empty() {
        out.push(GenaiMessage::from(calls));
    }
    out
}

fn user_blocks(blocks: Vec<ContentBlock>) -> Vec<GenaiMessage> {
    blocks
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(GenaiMessage::user(text)),
            ContentBlock::ToolResult { tool_use_id, content } => {
                Some(GenaiMessage::from(GenaiToolResponse::new(tool_use_id, content)))
            }
            ContentBlock::ToolUse { .. } => None,
        })
        .collect()
}

/// Convert a transcript to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().flat_map(to_genai_message).collect()
}

/// Build a genai tool call from a tool-use block
pub fn to_genai_tool_call(tool_use: &ToolUse) -> Result<GenaiToolCall, ProviderError> {
    serde_json::from_value(json!({
        "call_id": tool_use.id,
        "fn_name": tool_use.name,
        "fn_arguments": tool_use.input,
    }))
    .map_err(|e| {
        ProviderError::invalid_response("genai", format!("tool call {} ({}): {}", tool_use.id, tool_use.name, e))
    })
}

// ============================================================================
// Tool Conversion: graphchat -> genai
// ============================================================================

pub fn to_genai_tool(tool: ToolDescriptor) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_schema(tool.input_schema);

    if let Some(description) = &tool.description {
        genai_tool = genai_tool.with_description(description);
    }

    genai_tool
}

pub fn to_genai_tools(tools: Vec<ToolDescriptor>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: graphchat -> genai
// ============================================================================

pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Tool calls are only reported in full at the End event
    genai_opts = genai_opts.with_capture_tool_calls(true);

    genai_opts
}

// ============================================================================
// Response Conversion: genai -> graphchat
// ============================================================================

pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolUse {
    ToolUse::new(tc.call_id.clone(), tc.fn_name.clone(), tc.fn_arguments.clone())
}

/// Convert a genai stream event into zero or more chunks
///
/// `End` expands into every captured tool call followed by `Done`. genai does
/// not surface the wire stop reason, so it is derived from the tool calls.
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<Result<StreamChunk, ProviderError>> {
    match event {
        ChatStreamEvent::Chunk(chunk) => vec![Ok(StreamChunk::text(chunk.content))],
        ChatStreamEvent::ToolCallChunk(chunk) => vec![Ok(StreamChunk::tool_call_delta(
            chunk.tool_call.call_id,
            Some(chunk.tool_call.fn_name),
            Some(chunk.tool_call.fn_arguments.to_string()),
        ))],
        ChatStreamEvent::End(end) => {
            let tool_calls: Vec<ToolUse> = end
                .captured_tool_calls()
                .map(|calls| calls.into_iter().map(|tc| from_genai_tool_call(tc)).collect())
                .unwrap_or_default();

            let stop_reason = if tool_calls.is_empty() {
                StopReason::EndTurn
            } else {
                StopReason::ToolUse
            };

            tool_calls
                .into_iter()
                .map(|tc| Ok(StreamChunk::tool_call(tc)))
                .chain(std::iter::once(Ok(StreamChunk::done(stop_reason))))
                .collect()
        }
        ChatStreamEvent::Start => vec![],
        ChatStreamEvent::ReasoningChunk(_) => vec![],
        ChatStreamEvent::ThoughtSignatureChunk(_) => vec![],
    }
}

// ============================================================================
// Provider Resolution
// ============================================================================

/// Provider configuration for routing
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "openai", "azure", "openrouter")
    pub provider: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

/// Create a genai Client with our auth and endpoint resolution
///
/// The API key is resolved by the caller from the secret store. Without one,
/// genai falls back to its own lookup (fine for keyless providers like Ollama).
pub fn create_client(config: &ProviderConfig) -> Client {
    let provider = config.provider.clone();
    let auth_explicit_key = config.api_key.clone();
    let api_base = config.api_base.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let explicit_key = auth_explicit_key.clone();
            Box::pin(async move { Ok(explicit_key.map(AuthData::from_single)) })
        },
    );

    let target_provider = provider;
    let target_api_base = api_base;

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { ref model, .. } = target;

            let (endpoint, adapter_kind): (Endpoint, AdapterKind) = match target_provider.as_str() {
                "azure" => match target_api_base.as_ref() {
                    Some(url) => (Endpoint::from_owned(url.clone()), AdapterKind::OpenAI),
                    None => return Ok(target),
                },
                "openrouter" => (
                    Endpoint::from_static("https://openrouter.ai/api/v1/"),
                    AdapterKind::OpenAI,
                ),
                "mistral" => (
                    Endpoint::from_static("https://api.mistral.ai/v1/"),
                    AdapterKind::OpenAI,
                ),
                // Native genai providers, optionally pointed at a custom base
                _ => match target_api_base.as_ref() {
                    Some(url) => (Endpoint::from_owned(url.clone()), model.adapter_kind),
                    None => return Ok(target),
                },
            };

            let resolved_model = ModelIden::new(adapter_kind, model.model_name.clone());

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model: resolved_model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat)
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider)
        || matches!(provider.to_lowercase().as_str(), "azure" | "openrouter" | "mistral")
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai::chat::ChatRole as GenaiRole;

    #[test]
    fn test_text_message_conversion() {
        let converted = to_genai_message(ChatMessage::user("Hello, world!"));
        assert_eq!(converted.len(), 1);
        assert!(matches!(converted[0].role, GenaiRole::User));
    }

    #[test]
    fn test_null_message_is_dropped() {
        assert!(to_genai_message(ChatMessage::assistant_answer(None)).is_empty());
    }

    #[test]
    fn test_tool_exchange_conversion() {
        let transcript = vec![
            ChatMessage::user("How many nodes?"),
            ChatMessage::with_blocks(
                MessageRole::Assistant,
                vec![
                    ContentBlock::text("Counting."),
                    ContentBlock::tool_use("t1", "read_neo4j_cypher", json!({ "query": "RETURN 1" })),
                ],
            ),
            ChatMessage::tool_results(vec![ContentBlock::tool_result("t1", "[{\"1\":1}]")]),
        ];

        let converted = to_genai_messages(transcript);
        // user, assistant text, assistant tool calls, tool response
        assert_eq!(converted.len(), 4);
        assert!(matches!(converted[1].role, GenaiRole::Assistant));
        assert!(matches!(converted[2].role, GenaiRole::Assistant));
        assert!(matches!(converted[3].role, GenaiRole::Tool));
    }

    #[test]
    fn test_tool_call_round_trip() {
        let tool_use = ToolUse::new("call_1", "read_neo4j_cypher", json!({"query": "RETURN 1"}));
        let call = to_genai_tool_call(&tool_use).unwrap();
        assert_eq!(call.call_id, "call_1");
        assert_eq!(call.fn_arguments, json!({"query": "RETURN 1"}));
        assert_eq!(from_genai_tool_call(&call), tool_use);
    }

    #[test]
    fn test_tool_conversion() {
        let tool = ToolDescriptor::new("read_neo4j_cypher")
            .with_description("Run a read query")
            .with_schema(json!({
                "type": "object",
                "properties": { "query": { "type": "string" } }
            }));

        let genai_tool = to_genai_tool(tool);
        assert_eq!(genai_tool.name, "read_neo4j_cypher");
    }

    #[test]
    fn test_provider_detection() {
        assert!(is_genai_native("openai"));
        assert!(is_genai_native("anthropic"));
        assert!(!is_genai_native("azure"));

        assert!(is_genai_supported("azure"));
        assert!(is_genai_supported("openrouter"));
        assert!(is_genai_supported("mistral"));
        assert!(!is_genai_supported("unknown_provider"));
    }
}
