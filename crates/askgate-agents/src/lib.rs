//! # askgate-agents
//!
//! The agent facade behind the askgate API.
//!
//! Three independent agents answer natural-language questions:
//! - **Tabular**: questions about an in-memory table (CSV or pandas split JSON)
//! - **Context**: retrieval-augmented answers over a text blob, with an
//!   on-disk embedding cache keyed by content hash
//! - **SQL**: questions answered by generating and running read-only
//!   queries against a SQLite database
//!
//! Each agent exposes `ask` and `replace_source`. The [`AgentFacade`]
//! dispatches to them by [`AgentKind`] and passes arguments and results
//! through unchanged. Failures surface to the caller as [`AgentError`];
//! nothing here retries.

pub mod agent;
pub mod bootstrap;
pub mod context;
pub mod error;
pub mod facade;
pub mod llm;
pub mod splitter;
pub mod sql;
pub mod table;
pub mod tabular;

pub use agent::{Agent, AgentKind, SourceDescriptor, render_conversation};
pub use bootstrap::{BootstrapReport, bootstrap_sqlite};
pub use context::{ContextAgent, NO_CONTEXT_ANSWER};
pub use error::AgentError;
pub use facade::AgentFacade;
pub use llm::{Embedder, LanguageModel, OpenAiClient};
pub use sql::SqlAgent;
pub use table::Table;
pub use tabular::TabularAgent;
