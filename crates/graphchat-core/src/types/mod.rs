//! Core types for chat interactions
//!
//! This module contains all the shared types used across providers, tools and the chat loop.

mod message;
mod tool;
mod stream;
mod response;
mod cancellation;

pub use message::{ChatMessage, ContentBlock, MessageRole, MessageContent};
pub use tool::{ToolDescriptor, ToolUse, error_envelope};
pub use stream::{StreamChunk, StopReason};
pub use response::ModelResponse;
pub use cancellation::CancellationToken;
