//! Model provider configuration.

use super::env_value;
use serde::{Deserialize, Serialize};

/// Settings for the OpenAI-compatible chat and embedding endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Environment variable containing the provider API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the provider, without the `/v1` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat completion model.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model used by the context agent.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            temperature: 0.0,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the environment, if set.
    pub fn resolve_api_key(&self) -> Option<String> {
        env_value(&self.api_key_env)
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}
