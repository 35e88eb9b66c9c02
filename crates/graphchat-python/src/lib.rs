//! Python bindings for GraphChat via PyO3
//!
//! The chat UI host owns a `ChatSession`, connects it to MCP servers and
//! calls `send` for each user message. Streamed tokens and tool steps are
//! delivered through optional Python callbacks.

use pyo3::prelude::*;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

use graphchat_core::chat::{
    starters as core_starters, ChatSession as CoreChatSession, OutputSink,
};
use graphchat_core::config::{
    load_layered, ChatSettings, ConfigProvider, FileConfigProvider, McpServerConfig,
    ToolUsePolicy,
};
use graphchat_core::logging::{ConsoleLogger, Logger, NoOpLogger};
use graphchat_core::secrets::{
    default_secret_store, KeychainSecretStore as CoreKeychainSecretStore,
    SecretStore as _,
};
use graphchat_core::CancellationToken;

fn runtime_error(e: impl std::fmt::Display) -> PyErr {
    PyRuntimeError::new_err(e.to_string())
}

// ============================================================================
// Output Sink
// ============================================================================

/// Forwards streamed output to Python callables
///
/// `on_token(fragment)` is called per text fragment. `on_step(name, output)`
/// is called when a tool step starts (output `None`) and when it finishes.
struct CallbackSink {
    on_token: Option<PyObject>,
    on_step: Option<PyObject>,
    step_name: Mutex<String>,
}

fn notify(callback: &Option<PyObject>, call: impl FnOnce(Python<'_>, &PyObject) -> PyResult<PyObject>) {
    if let Some(callback) = callback {
        Python::with_gil(|py| {
            if let Err(e) = call(py, callback) {
                e.print(py);
            }
        });
    }
}

impl OutputSink for CallbackSink {
    fn write(&self, fragment: &str) {
        notify(&self.on_token, |py, cb| cb.call1(py, (fragment,)));
    }

    fn finish(&self) {}

    fn set_step_name(&self, name: &str) {
        if let Ok(mut current) = self.step_name.lock() {
            *current = name.to_string();
        }
        notify(&self.on_step, |py, cb| cb.call1(py, (name, None::<&str>)));
    }

    fn set_step_output(&self, output: &str) {
        let name = self.step_name.lock().map(|n| n.clone()).unwrap_or_default();
        notify(&self.on_step, |py, cb| cb.call1(py, (name, Some(output))));
    }
}

// ============================================================================
// Starters
// ============================================================================

#[pyclass]
#[derive(Clone)]
pub struct Starter {
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub message: String,
}

#[pymethods]
impl Starter {
    fn __repr__(&self) -> String {
        format!("Starter(label='{}')", self.label)
    }
}

/// Suggested opening questions for a new chat
#[pyfunction]
fn starters() -> Vec<Starter> {
    core_starters()
        .into_iter()
        .map(|s| Starter { label: s.label, message: s.message })
        .collect()
}

// ============================================================================
// KeychainSecretStore
// ============================================================================

/// System keychain access for storing provider API keys
#[pyclass]
pub struct KeychainSecretStore {
    inner: Arc<CoreKeychainSecretStore>,
}

#[pymethods]
impl KeychainSecretStore {
    #[new]
    #[pyo3(signature = (service=None))]
    pub fn new(service: Option<&str>) -> Self {
        let inner = match service {
            Some(s) => CoreKeychainSecretStore::with_service(s),
            None => CoreKeychainSecretStore::new(),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn is_available(&self) -> bool { self.inner.is_available() }

    pub fn has(&self, provider: &str) -> bool { self.inner.has(provider) }

    pub fn store(&self, provider: &str, api_key: &str) -> PyResult<()> {
        self.inner.store(provider, api_key).map_err(runtime_error)
    }

    pub fn delete(&self, provider: &str) -> PyResult<()> {
        self.inner.delete(provider).map_err(runtime_error)
    }

    fn __repr__(&self) -> String { format!("KeychainSecretStore(name='{}')", self.inner.name()) }
}

// ============================================================================
// ChatSession
// ============================================================================

#[pyclass]
pub struct ChatSession {
    runtime: Runtime,
    inner: Arc<tokio::sync::Mutex<CoreChatSession>>,
    cancel_token: CancellationToken,
    servers: Vec<McpServerConfig>,
}

#[pymethods]
impl ChatSession {
    /// Create a session from user and workspace config, overridden by any
    /// keyword arguments given.
    #[new]
    #[pyo3(signature = (provider=None, model=None, max_tokens=None, api_base=None, tool_use_policy=None, workspace=None, debug=false))]
    pub fn new(
        provider: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        api_base: Option<String>,
        tool_use_policy: Option<&str>,
        workspace: Option<String>,
        debug: bool,
    ) -> PyResult<Self> {
        let runtime = Runtime::new().map_err(runtime_error)?;

        let user = FileConfigProvider::user();
        let workspace = workspace.map(FileConfigProvider::workspace);
        let mut levels: Vec<&dyn ConfigProvider> = vec![&user];
        if let Some(ws) = &workspace {
            levels.push(ws);
        }
        let config = runtime.block_on(load_layered(&levels));

        let mut overrides = ChatSettings::new();
        overrides.provider = provider;
        overrides.model = model;
        overrides.max_tokens = max_tokens;
        overrides.api_base = api_base;
        overrides.tool_use_policy = tool_use_policy.map(parse_policy).transpose()?;

        let settings = config.settings.merge(&overrides).resolve();
        let logger: Arc<dyn Logger> = if debug {
            Arc::new(ConsoleLogger::new())
        } else {
            Arc::new(NoOpLogger::new())
        };
        let secrets = default_secret_store();
        let session = CoreChatSession::from_settings(&settings, &*secrets, logger);
        let cancel_token = session.cancel_token();

        Ok(Self {
            runtime,
            inner: Arc::new(tokio::sync::Mutex::new(session)),
            cancel_token,
            servers: config.mcp_servers,
        })
    }

    /// Names of the MCP servers found in config
    pub fn configured_servers(&self) -> Vec<String> {
        self.servers.iter().map(|s| s.name.clone()).collect()
    }

    /// Connect every configured MCP server. Returns the number of tools registered.
    pub fn connect_configured(&self, py: Python<'_>) -> PyResult<usize> {
        let servers = self.servers.clone();
        self.connect_all(py, servers)
    }

    pub fn connect_http(&self, py: Python<'_>, name: String, url: String) -> PyResult<usize> {
        self.connect_all(py, vec![McpServerConfig::http(name, url)])
    }

    pub fn connect_unix(&self, py: Python<'_>, name: String, path: String) -> PyResult<usize> {
        self.connect_all(py, vec![McpServerConfig::unix(name, path)])
    }

    pub fn disconnect(&self, py: Python<'_>, name: &str) -> bool {
        py.allow_threads(|| {
            self.runtime.block_on(async { self.inner.lock().await.disconnect(name) })
        })
    }

    /// Connection name that owns `tool_name`, if any
    pub fn find_owner(&self, py: Python<'_>, tool_name: &str) -> Option<String> {
        py.allow_threads(|| {
            self.runtime
                .block_on(async { self.inner.lock().await.registry().find_owner(tool_name) })
        })
    }

    /// Names of all registered tools
    pub fn tool_names(&self, py: Python<'_>) -> Vec<String> {
        py.allow_threads(|| {
            self.runtime.block_on(async {
                self.inner
                    .lock()
                    .await
                    .registry()
                    .all_tools()
                    .into_iter()
                    .map(|t| t.name)
                    .collect()
            })
        })
    }

    /// Run one user turn. Returns the final answer, or `None` if the model gave no text.
    #[pyo3(signature = (text, on_token=None, on_step=None))]
    pub fn send(
        &self,
        py: Python<'_>,
        text: String,
        on_token: Option<PyObject>,
        on_step: Option<PyObject>,
    ) -> PyResult<Option<String>> {
        let sink = CallbackSink { on_token, on_step, step_name: Mutex::new(String::new()) };
        let inner = Arc::clone(&self.inner);
        let runtime = &self.runtime;

        py.allow_threads(|| {
            runtime.block_on(async move { inner.lock().await.on_user_message(&text, &sink).await })
        })
        .map_err(runtime_error)
    }

    /// Stop the model call in flight; safe to call from another thread
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn clear(&self, py: Python<'_>) {
        py.allow_threads(|| self.runtime.block_on(async { self.inner.lock().await.clear() }));
    }

    /// The conversation so far, as a JSON array of messages
    pub fn transcript_json(&self, py: Python<'_>) -> PyResult<String> {
        py.allow_threads(|| {
            self.runtime
                .block_on(async { serde_json::to_string(self.inner.lock().await.transcript()) })
        })
        .map_err(runtime_error)
    }

    fn __repr__(&self) -> String {
        format!("ChatSession(servers={})", self.servers.len())
    }
}

impl ChatSession {
    fn connect_all(&self, py: Python<'_>, servers: Vec<McpServerConfig>) -> PyResult<usize> {
        let inner = Arc::clone(&self.inner);
        let runtime = &self.runtime;

        py.allow_threads(|| {
            runtime.block_on(async move {
                let session = inner.lock().await;
                let mut total = 0;
                for server in &servers {
                    total += session.connect_server(server).await?;
                }
                Ok::<_, graphchat_core::ChatError>(total)
            })
        })
        .map_err(runtime_error)
    }
}

fn parse_policy(value: &str) -> PyResult<ToolUsePolicy> {
    match value {
        "first_only" => Ok(ToolUsePolicy::FirstOnly),
        "all" => Ok(ToolUsePolicy::All),
        other => Err(PyValueError::new_err(format!(
            "Unknown tool_use_policy '{}', expected 'first_only' or 'all'",
            other
        ))),
    }
}

// ============================================================================
// Module Definition
// ============================================================================

#[pymodule]
fn graphchat(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ChatSession>()?;
    m.add_class::<Starter>()?;
    m.add_class::<KeychainSecretStore>()?;

    m.add_function(wrap_pyfunction!(starters, m)?)?;

    Ok(())
}
