//! LLM Provider implementations
//!
//! ## Architecture
//!
//! - `AnthropicProvider` speaks the Messages API directly over SSE. It is the
//!   default, and the only path that reports the model's own stop reason.
//! - `GenaiProvider` covers everything else through the `genai` crate.
//!   Providers not native to genai (Azure, OpenRouter, Mistral) go through
//!   genai's `ServiceTargetResolver` using OpenAI-compatible protocols.
//! - `MockProvider` is kept for testing.

mod traits;
mod error;
mod sse;
mod anthropic;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};

pub use anthropic::{
    build_request_body, AnthropicProvider, AnthropicStreamDecoder, ANTHROPIC_API_BASE,
    ANTHROPIC_VERSION,
};
pub use sse::{SseEvent, SseParser};
pub use genai_provider::GenaiProvider;
pub use genai_adapter::{is_genai_native, is_genai_supported, ProviderConfig};

pub use mock::{MockConfig, MockMode, MockProvider, MockRequest, MockTurn};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `anthropic` uses the native SSE client, `mock` the mock provider. Anything
/// else goes to `GenaiProvider`; unknown IDs are treated as OpenAI-compatible.
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "anthropic" => Arc::new(AnthropicProvider::new(logger)),
        "mock" => Arc::new(MockProvider::echo(logger)),
        _ => Arc::new(GenaiProvider::new(provider_id, logger)),
    }
}

/// List all supported provider IDs
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        "anthropic",
        // genai native
        "openai",
        "gemini",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        // OpenAI-compatible via resolver
        "azure",
        "openrouter",
        "mistral",
        // Testing
        "mock",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_create_provider_routing() {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
        assert_eq!(create_provider("anthropic", Arc::clone(&logger)).name(), "anthropic");
        assert_eq!(create_provider("Anthropic", Arc::clone(&logger)).name(), "anthropic");
        assert_eq!(create_provider("mock", Arc::clone(&logger)).name(), "mock");
        assert_eq!(create_provider("openai", Arc::clone(&logger)).name(), "openai");
        assert_eq!(
            create_provider("anthropic", logger).default_api_base(),
            ANTHROPIC_API_BASE
        );
    }

    #[test]
    fn test_supported_providers() {
        let providers = supported_providers();
        assert!(providers.contains(&"anthropic"));
        assert!(providers.contains(&"mock"));
        for id in providers {
            if id != "anthropic" && id != "mock" {
                assert!(is_genai_supported(id), "{} should route through genai", id);
            }
        }
    }
}
