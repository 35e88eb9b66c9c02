//! Finalized model response

use serde::{Deserialize, Serialize};

use super::message::ContentBlock;
use super::stream::StopReason;
use super::tool::ToolUse;

/// The structured message the model produced once streaming completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

impl ModelResponse {
    pub fn new(stop_reason: StopReason, content: Vec<ContentBlock>) -> Self {
        Self { stop_reason, content }
    }

    /// Whether the model is asking for a tool invocation
    pub fn wants_tool(&self) -> bool {
        self.stop_reason == StopReason::ToolUse
    }

    /// All tool-use blocks, in the order the model emitted them
    pub fn tool_uses(&self) -> Vec<ToolUse> {
        self.content.iter().filter_map(ToolUse::from_block).collect()
    }

    /// The first tool-use block, if any
    pub fn first_tool_use(&self) -> Option<ToolUse> {
        self.content.iter().find_map(ToolUse::from_block)
    }

    /// The first text block, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }
}
