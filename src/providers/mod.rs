//! Provider seams for the three upstreams: embedding, vector store and
//! generation.
//!
//! The orchestrators depend only on these traits; concrete adapters
//! ([`cohere::CohereClient`], [`qdrant::QdrantStore`]) are injected at
//! construction so tests can substitute stubs.

pub mod cohere;
pub mod qdrant;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::rag::models::ChunkPayload;

/// Embedding intent: providers pre-condition vectors asymmetrically for
/// being-searched (document) versus searching (query) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedIntent {
    Document,
    Query,
}

impl EmbedIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            EmbedIntent::Document => "search_document",
            EmbedIntent::Query => "search_query",
        }
    }
}

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding provider returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("provider returned {got} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vector store returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation provider returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("generation provider returned no text")]
    Empty,
}

/// One point to upsert: dense integer id, vector, typed payload.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// One nearest-neighbor hit, best-first.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub score: f32,
    pub payload: ChunkPayload,
}

/// Parameters for a single generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Invariant system instruction.
    pub system: String,
    /// User message carrying the grounding context and question.
    pub message: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Order-preserving batch text embedding.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(
        &self,
        texts: &[String],
        intent: EmbedIntent,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Collection-scoped vector store operations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Drop the collection if it exists and create it fresh with the given
    /// dimension (cosine distance). Destructive; see the indexing pipeline.
    async fn recreate_collection(&self, dimension: u32) -> Result<(), VectorStoreError>;

    /// Bulk upsert of points.
    async fn upsert(&self, points: Vec<ChunkPoint>) -> Result<(), VectorStoreError>;

    /// Top-`limit` nearest neighbors for `vector`, best-first.
    async fn search(&self, vector: &[f32], limit: usize)
        -> Result<Vec<ScoredPoint>, VectorStoreError>;

    /// Number of points currently in the collection.
    async fn point_count(&self) -> Result<u64, VectorStoreError>;
}

/// Single-shot constrained text generation.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
