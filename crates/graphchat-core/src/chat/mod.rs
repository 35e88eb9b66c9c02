//! The chat loop
//!
//! ```rust,ignore
//! use graphchat_core::chat::{ChatSession, CollectingSink};
//!
//! let mut session = ChatSession::from_settings(&settings, &*secrets, logger);
//! session.connect_server(&McpServerConfig::http("neo4j-mcp", "http://localhost:8000/mcp/")).await?;
//!
//! let sink = CollectingSink::new();
//! let answer = session.on_user_message("How many nodes are there?", &sink).await?;
//! ```

mod error;
mod prompt;
mod sink;
mod driver;
mod session;

pub use error::{ChatError, ChatResult};
pub use prompt::{starters, Starter, SYSTEM_PROMPT};
pub use sink::{CollectingSink, NullSink, OutputSink, RecordedStep};
pub use driver::ConversationDriver;
pub use session::ChatSession;
