//! Tool registry: which connection exposes which tools
//!
//! Connections are kept in the order they were first registered; owner lookup
//! scans them in that order, so a tool name offered by two connections
//! resolves to the earlier one.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::types::ToolDescriptor;

/// Per-session map from connection name to its tool list
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    entries: Arc<RwLock<Vec<(String, Vec<ToolDescriptor>)>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the tool list for a connection, replacing any previous list.
    ///
    /// A re-registered connection keeps its original position.
    pub fn register(&self, connection_name: impl Into<String>, tools: Vec<ToolDescriptor>) {
        let connection_name = connection_name.into();
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(name, _)| *name == connection_name) {
            Some((_, existing)) => *existing = tools,
            None => entries.push((connection_name, tools)),
        }
    }

    /// Drop a connection's tools, returning them if it was registered
    pub fn unregister(&self, connection_name: &str) -> Option<Vec<ToolDescriptor>> {
        let mut entries = self.entries.write();
        let index = entries.iter().position(|(name, _)| name == connection_name)?;
        Some(entries.remove(index).1)
    }

    /// Name of the first connection whose tool list contains `tool_name`
    pub fn find_owner(&self, tool_name: &str) -> Option<String> {
        self.entries
            .read()
            .iter()
            .find(|(_, tools)| tools.iter().any(|t| t.name == tool_name))
            .map(|(name, _)| name.clone())
    }

    /// Every registered tool, flattened in registration order
    pub fn all_tools(&self) -> Vec<ToolDescriptor> {
        self.entries
            .read()
            .iter()
            .flat_map(|(_, tools)| tools.iter().cloned())
            .collect()
    }

    pub fn tools_for(&self, connection_name: &str) -> Option<Vec<ToolDescriptor>> {
        self.entries
            .read()
            .iter()
            .find(|(name, _)| name == connection_name)
            .map(|(_, tools)| tools.clone())
    }

    /// Connection names in registration order
    pub fn connection_names(&self) -> Vec<String> {
        self.entries.read().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn tool_count(&self) -> usize {
        self.entries.read().iter().map(|(_, tools)| tools.len()).sum()
    }
}
