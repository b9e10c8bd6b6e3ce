//! # askgate-core
//!
//! Configuration and message types shared by every askgate crate.

pub mod config;
pub mod message;

pub use config::{
    AgentsConfig, AskgateConfig, AuthConfig, ConfigError, ContextAgentConfig, LlmConfig,
    ServerConfig, SqlAgentConfig, TabularAgentConfig,
};
pub use message::ChatMessage;
