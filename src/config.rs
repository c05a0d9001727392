//! Service configuration.
//!
//! Upstream credentials and endpoints come from the environment; a missing
//! credential leaves the corresponding provider unconfigured rather than
//! failing startup, and the health check reports it as degraded. Chunking and
//! retrieval tuning lives in [`RagConfig`] with defaults matching the indexed
//! collection.

use std::env;

use serde::{Deserialize, Serialize};

/// Default bind address for the HTTP API.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Process-level configuration read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cohere API key (`COHERE_API_KEY`). None leaves chat degraded.
    pub cohere_api_key: Option<String>,
    /// Qdrant endpoint URL (`QDRANT_URL`).
    pub qdrant_url: Option<String>,
    /// Optional Qdrant API key (`QDRANT_API_KEY`).
    pub qdrant_api_key: Option<String>,
    /// Address the HTTP API binds to (`BIND_ADDR`).
    pub bind_addr: String,
    /// RAG pipeline tuning.
    pub rag: RagConfig,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            cohere_api_key: non_empty_var("COHERE_API_KEY"),
            qdrant_url: non_empty_var("QDRANT_URL"),
            qdrant_api_key: non_empty_var("QDRANT_API_KEY"),
            bind_addr: non_empty_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            rag: RagConfig::default(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Tuning parameters for segmentation, retrieval and generation.
///
/// Changing `chunk_size` or `overlap_words` changes every downstream chunk
/// identity, so any previously built collection must be re-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagConfig {
    /// Vector store collection name.
    pub collection: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Generation model identifier.
    pub llm_model: String,
    /// Embedding vector dimension; collection-wide invariant.
    pub dimension: u32,
    /// Target chunk size budget in characters.
    pub chunk_size: usize,
    /// Trailing word overlap carried between split chunks.
    pub overlap_words: usize,
    /// Sections shorter than this are dropped entirely.
    pub min_section_chars: usize,
    /// Texts per embedding request (provider rate-limit driven).
    pub batch_size: usize,
    /// Nearest-neighbor results requested per query.
    pub top_k: usize,
    /// Retrieved chunks actually included in the prompt.
    pub context_chunks: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: "textbook_content".to_string(),
            embedding_model: "embed-english-light-v3.0".to_string(),
            llm_model: "command-light".to_string(),
            dimension: 384,
            chunk_size: 800,
            overlap_words: 20,
            min_section_chars: 50,
            batch_size: 96,
            top_k: 5,
            context_chunks: 5,
        }
    }
}
