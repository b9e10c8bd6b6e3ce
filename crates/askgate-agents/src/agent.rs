//! The agent trait and the descriptors used to swap an agent's data source.

use crate::error::AgentError;
use crate::table::Table;
use askgate_core::ChatMessage;
use async_trait::async_trait;
use std::fmt;

/// Which agent a call is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Tabular,
    Context,
    Sql,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Tabular => "tabular",
            AgentKind::Context => "context",
            AgentKind::Sql => "sql",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A replacement data source.
#[derive(Debug, Clone)]
pub enum SourceDescriptor {
    /// A table for the tabular agent.
    Table(Table),
    /// Free text for the context agent.
    Text(String),
    /// A `sqlite:///<path>` URI for the SQL agent.
    DatabaseUri(String),
}

impl SourceDescriptor {
    pub fn describe(&self) -> &'static str {
        match self {
            SourceDescriptor::Table(_) => "table",
            SourceDescriptor::Text(_) => "text",
            SourceDescriptor::DatabaseUri(_) => "database URI",
        }
    }
}

/// A question-answering agent with a replaceable data source.
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    /// Answer the latest question in `conversation`.
    async fn ask(&self, conversation: &[ChatMessage]) -> Result<String, AgentError>;

    /// Swap the data source. Later `ask` calls see the new source.
    async fn replace_source(&self, source: SourceDescriptor) -> Result<(), AgentError>;
}

/// Render a conversation as `"Role: content"` lines.
pub fn render_conversation(conversation: &[ChatMessage]) -> String {
    conversation
        .iter()
        .map(|m| format!("{}: {}", m.role_label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn wrong_source(kind: AgentKind, expected: &str, got: &SourceDescriptor) -> AgentError {
    AgentError::InvalidSource(format!(
        "the {} agent expects a {}, got a {}",
        kind,
        expected,
        got.describe()
    ))
}
