//! Data source configuration for the three agents.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default)]
    pub tabular: TabularAgentConfig,

    #[serde(default)]
    pub context: ContextAgentConfig,

    #[serde(default)]
    pub sql: SqlAgentConfig,
}

/// Dataframe-style agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularAgentConfig {
    /// CSV file loaded at startup. Missing files are skipped with a warning.
    #[serde(default = "default_csv")]
    pub default_csv: PathBuf,

    /// Maximum number of rows rendered into the prompt.
    #[serde(default = "default_max_prompt_rows")]
    pub max_prompt_rows: usize,
}

impl Default for TabularAgentConfig {
    fn default() -> Self {
        Self {
            default_csv: default_csv(),
            max_prompt_rows: default_max_prompt_rows(),
        }
    }
}

/// Retrieval-augmented agent over a text blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextAgentConfig {
    /// Directory for cached embedding indexes, keyed by content hash.
    #[serde(default = "default_embedding_dir")]
    pub embedding_dir: PathBuf,

    /// Target chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for ContextAgentConfig {
    fn default() -> Self {
        Self {
            embedding_dir: default_embedding_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

/// SQL question-answering agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlAgentConfig {
    /// Database opened at startup (`sqlite:///<path>`).
    #[serde(default = "default_db_uri")]
    pub default_db_uri: String,

    /// Row cap applied to generated queries.
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
}

impl Default for SqlAgentConfig {
    fn default() -> Self {
        Self {
            default_db_uri: default_db_uri(),
            max_rows: default_max_rows(),
        }
    }
}

fn default_csv() -> PathBuf {
    PathBuf::from("data/retail_transactions_dataset.csv")
}

fn default_max_prompt_rows() -> usize {
    200
}

fn default_embedding_dir() -> PathBuf {
    PathBuf::from("data/embeddings")
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_top_k() -> usize {
    4
}

fn default_db_uri() -> String {
    "sqlite:///data/retail_transactions_data.db".to_string()
}

fn default_max_rows() -> u32 {
    100
}
