//! Retrieval-augmented answers over a text blob.
//!
//! Replacing the source chunks the text, embeds each chunk and stores the
//! index at `<embedding_dir>/<sha256(text)>.json`. Loading the same text
//! again reuses that file instead of calling the embedding model.

use crate::agent::{Agent, AgentKind, SourceDescriptor, render_conversation, wrong_source};
use crate::error::AgentError;
use crate::llm::{Embedder, LanguageModel};
use crate::splitter::split_text;
use askgate_core::{ChatMessage, ContextAgentConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Answer given when no text has been loaded yet.
pub const NO_CONTEXT_ANSWER: &str = "No context loaded for RAG agent.";

const ANSWER_PROMPT: &str = "Use the following pieces of context to answer the user's question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Chunks and their embeddings, as persisted in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingIndex {
    pub chunks: Vec<IndexedChunk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub text: String,
    pub embedding: Vec<f32>,
}

impl EmbeddingIndex {
    /// The `k` chunks most similar to `query`, best first.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<&IndexedChunk> {
        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .chunks
            .iter()
            .map(|c| (cosine_similarity(query, &c.embedding), c))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(k).map(|(_, c)| c).collect()
    }
}

pub struct ContextAgent {
    model: Arc<dyn LanguageModel>,
    embedder: Arc<dyn Embedder>,
    config: ContextAgentConfig,
    index: RwLock<Option<Arc<EmbeddingIndex>>>,
}

impl ContextAgent {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        config: ContextAgentConfig,
    ) -> Self {
        Self {
            model,
            embedder,
            config,
            index: RwLock::new(None),
        }
    }

    /// Cache file for a given text.
    pub fn index_path(&self, text: &str) -> PathBuf {
        index_path(&self.config.embedding_dir, text)
    }

    async fn load_or_build(&self, text: &str) -> Result<EmbeddingIndex, AgentError> {
        let path = self.index_path(text);

        if tokio::fs::try_exists(&path).await? {
            let raw = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<EmbeddingIndex>(&raw) {
                Ok(index) => {
                    tracing::info!(path = %path.display(), chunks = index.chunks.len(), "Loaded cached embeddings");
                    return Ok(index);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable embedding cache");
                }
            }
        }

        let chunks = split_text(text, self.config.chunk_size, self.config.chunk_overlap);
        if chunks.is_empty() {
            return Err(AgentError::InvalidSource("context text is empty".to_string()));
        }

        let embeddings = self.embedder.embed(&chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(AgentError::Upstream(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let index = EmbeddingIndex {
            chunks: chunks
                .into_iter()
                .zip(embeddings)
                .map(|(text, embedding)| IndexedChunk { text, embedding })
                .collect(),
        };

        tokio::fs::create_dir_all(&self.config.embedding_dir).await?;
        tokio::fs::write(&path, serde_json::to_vec(&index)?).await?;
        tracing::info!(path = %path.display(), chunks = index.chunks.len(), "Saved new embeddings");

        Ok(index)
    }
}

#[async_trait]
impl Agent for ContextAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Context
    }

    async fn ask(&self, conversation: &[ChatMessage]) -> Result<String, AgentError> {
        let Some(index) = self.index.read().await.clone() else {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        };

        let query = render_conversation(conversation);
        let query_embedding = self
            .embedder
            .embed(std::slice::from_ref(&query))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Upstream("no embedding returned for question".into()))?;

        let context = index
            .top_k(&query_embedding, self.config.top_k)
            .into_iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let messages = [
            ChatMessage::system(format!("{}\n\n{}", ANSWER_PROMPT, context)),
            ChatMessage::user(query),
        ];
        self.model.complete(&messages).await
    }

    async fn replace_source(&self, source: SourceDescriptor) -> Result<(), AgentError> {
        match source {
            SourceDescriptor::Text(text) => {
                let index = self.load_or_build(&text).await?;
                *self.index.write().await = Some(Arc::new(index));
                Ok(())
            }
            other => Err(wrong_source(AgentKind::Context, "text", &other)),
        }
    }
}

/// `<dir>/<hex sha256 of text>.json`
pub fn index_path(dir: &Path, text: &str) -> PathBuf {
    let digest = Sha256::digest(text.as_bytes());
    dir.join(format!("{}.json", hex::encode(digest)))
}

/// Cosine similarity; zero when either vector has zero length or norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
