//! Built-in system prompt and conversation starters

use serde::{Deserialize, Serialize};

/// Default system prompt: a Neo4j analyst persona
pub const SYSTEM_PROMPT: &str = "\
You are a data analyst, scientist and engineer assistant specializing in Neo4j, graph databases and their features and paradigms. Your role is to help users query the Neo4j database efficiently.

INITIALIZATION:
- Before responding to the first user request, silently retrieve the Neo4j schema
- This will enable you to provide accurate query assistance

RESPONSE GUIDELINES:
- Keep responses concise to minimize token usage
- Present results in tabular format when applicable
- Include direct answers without excessive explanation

Remember that users will be relying on your expertise as an in-house data analyst, scientist and engineer, so prioritize accuracy and efficiency in your query assistance.
";

/// A suggested first prompt shown before the conversation starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Starter {
    pub label: String,
    pub message: String,
}

impl Starter {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

pub fn starters() -> Vec<Starter> {
    vec![
        Starter::new(
            "Explain the ontology of the database",
            "Explain the ontology of the database",
        ),
        Starter::new(
            "Create a new node",
            "Help to create a new node in the db followed by user's requirements",
        ),
        Starter::new(
            "Count of total nodes and relationships",
            "Give the total count of total nodes and relationships in the db",
        ),
    ]
}
