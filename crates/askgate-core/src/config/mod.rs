//! Configuration types for askgate.
//!
//! Configuration is read from a single YAML file (`askgate.yaml` by default).
//! Every section has defaults, so an absent file or an empty document yields a
//! usable configuration. Secrets never live in the file itself: each section
//! names the environment variable that holds them.

pub mod agents;
pub mod auth;
pub mod llm;
pub mod server;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use agents::{AgentsConfig, ContextAgentConfig, SqlAgentConfig, TabularAgentConfig};
pub use auth::AuthConfig;
pub use llm::LlmConfig;
pub use server::ServerConfig;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "askgate.yaml";

/// Complete askgate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskgateConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token issuance settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Model provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Per-agent data source settings.
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} must be set in environment variables")]
    MissingSecret(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AskgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from `askgate.yaml` if it exists,
    /// falling back to defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::Config(
                "auth.token_ttl_secs must be greater than zero".to_string(),
            ));
        }
        let ctx = &self.agents.context;
        if ctx.chunk_size == 0 || ctx.chunk_overlap >= ctx.chunk_size {
            return Err(ConfigError::Config(format!(
                "agents.context.chunk_overlap ({}) must be smaller than chunk_size ({})",
                ctx.chunk_overlap, ctx.chunk_size
            )));
        }
        if ctx.top_k == 0 {
            return Err(ConfigError::Config(
                "agents.context.top_k must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read a value from an environment variable, exactly as set. Unset and
/// whitespace-only values count as missing.
pub(crate) fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
