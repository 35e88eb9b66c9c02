//! Tool-provider connections and the per-session connection pool

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::types::ToolDescriptor;

use super::error::McpResult;

/// A live session with a tool provider
///
/// `McpClient` is the production implementation; tests use in-memory doubles.
#[async_trait]
pub trait ToolConnection: Send + Sync {
    /// Fetch the tools this connection exposes
    async fn list_tools(&self) -> McpResult<Vec<ToolDescriptor>>;

    /// Run a tool and return its rendered result
    async fn call_tool(&self, name: &str, input: Value) -> McpResult<String>;
}

/// Live connection handles for one session, keyed by connection name
#[derive(Clone, Default)]
pub struct McpConnections {
    inner: Arc<RwLock<HashMap<String, Arc<dyn ToolConnection>>>>,
}

impl McpConnections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a handle, returning the one it replaced
    pub fn insert(
        &self,
        name: impl Into<String>,
        connection: Arc<dyn ToolConnection>,
    ) -> Option<Arc<dyn ToolConnection>> {
        self.inner.write().insert(name.into(), connection)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolConnection>> {
        self.inner.read().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn ToolConnection>> {
        self.inner.write().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Connection names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl std::fmt::Debug for McpConnections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpConnections")
            .field("names", &self.names())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeConnection;
    use super::*;

    #[test]
    fn test_pool_insert_get_remove() {
        let pool = McpConnections::new();
        assert!(pool.is_empty());

        let replaced = pool.insert("neo4j-mcp", Arc::new(FakeConnection::new(&["get_schema"])));
        assert!(replaced.is_none());
        assert!(pool.contains("neo4j-mcp"));
        assert!(pool.get("neo4j-mcp").is_some());
        assert!(pool.get("other").is_none());

        let replaced = pool.insert("neo4j-mcp", Arc::new(FakeConnection::new(&[])));
        assert!(replaced.is_some());
        assert_eq!(pool.len(), 1);

        assert!(pool.remove("neo4j-mcp").is_some());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let pool = McpConnections::new();
        let shared = pool.clone();
        pool.insert("b", Arc::new(FakeConnection::new(&[])));
        pool.insert("a", Arc::new(FakeConnection::new(&[])));
        assert_eq!(shared.names(), vec!["a", "b"]);
    }
}
