//! Error types for the agent facade.

use crate::agent::AgentKind;
use thiserror::Error;

/// Errors surfaced by agents. All of them are reported to the caller as-is.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent has no data source yet.
    #[error("no data source loaded for the {0} agent")]
    SourceNotLoaded(AgentKind),

    /// A replacement source was malformed or of the wrong kind.
    #[error("invalid data source: {0}")]
    InvalidSource(String),

    /// The model produced a query that is not a single read-only statement.
    #[error("refusing to run generated SQL: {0}")]
    UnsafeQuery(String),

    /// The model provider failed or returned something unusable.
    #[error("model provider error: {0}")]
    Upstream(String),

    /// SQLite error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// CSV parse error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (embedding cache, data files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Whether the request supplied a bad source rather than the agent failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AgentError::InvalidSource(_))
    }

    /// Whether the model provider, or something it generated, caused the failure.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AgentError::Upstream(_) | AgentError::UnsafeQuery(_))
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        AgentError::Upstream(e.to_string())
    }
}
