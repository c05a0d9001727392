//! Offline indexing pipeline: corpus discovery, segmentation, batch
//! embedding and collection replacement.
//!
//! The run is single-threaded and sequential. All embeddings for the full
//! corpus are obtained before the collection is touched, so an embedding
//! failure aborts the run without destroying the existing collection; a
//! failure after the recreate leaves the collection indeterminate and the
//! run must be repeated. Not safe to run concurrently with itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::RagConfig;
use crate::corpus::{self, CorpusError};
use crate::providers::{
    ChunkPoint, EmbedIntent, EmbeddingError, EmbeddingProvider, VectorStore, VectorStoreError,
};

use super::chunker;
use super::models::ChunkPayload;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("embedding batch {batch} failed: {source}")]
    Embedding {
        batch: usize,
        #[source]
        source: EmbeddingError,
    },

    #[error(transparent)]
    Store(#[from] VectorStoreError),

    #[error("no chunks produced from corpus at {0}")]
    EmptyCorpus(PathBuf),
}

/// Summary of a completed indexing run.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    /// Point count read back from the store after the upload.
    pub points: u64,
}

/// Owns chunk and embedding creation for the offline pipeline.
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: RagConfig,
}

impl Indexer {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: RagConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Index the corpus under `docs_dir`, replacing the collection wholesale.
    pub async fn run(&self, docs_dir: &Path) -> Result<IndexReport, IndexError> {
        let documents = corpus::discover(docs_dir)?;
        log::info!(
            "found {} markdown files under {}",
            documents.len(),
            docs_dir.display()
        );

        let mut payloads: Vec<ChunkPayload> = Vec::new();
        for doc in &documents {
            let chunks = chunker::chunk_document(&doc.content, &self.config);
            log::info!("{}: {} chunks", doc.relative_path, chunks.len());
            payloads.extend(
                chunks
                    .into_iter()
                    .map(|chunk| ChunkPayload::from_chunk(chunk, doc)),
            );
        }

        if payloads.is_empty() {
            return Err(IndexError::EmptyCorpus(docs_dir.to_path_buf()));
        }
        let chunk_count = payloads.len();

        // Embed the whole corpus before the destructive recreate so an
        // upstream failure leaves the existing collection intact.
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunk_count);
        let total_batches = chunk_count.div_ceil(self.config.batch_size);
        for (i, batch) in payloads.chunks(self.config.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
            let embedded = self
                .embedder
                .embed(&texts, EmbedIntent::Document)
                .await
                .map_err(|source| IndexError::Embedding {
                    batch: i + 1,
                    source,
                })?;
            vectors.extend(embedded);
            log::info!("embedded batch {}/{}", i + 1, total_batches);
        }

        self.store
            .recreate_collection(self.config.dimension)
            .await?;

        // Point ids are dense offsets in processing order, not content
        // derived; the collection is always replaced, never patched.
        let points: Vec<ChunkPoint> = payloads
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(id, (payload, vector))| ChunkPoint {
                id: id as u64,
                vector,
                payload,
            })
            .collect();
        self.store.upsert(points).await?;

        let points = self.store.point_count().await?;
        log::info!(
            "uploaded {chunk_count} chunks; collection '{}' now holds {points} points",
            self.config.collection
        );

        Ok(IndexReport {
            documents: documents.len(),
            chunks: chunk_count,
            points,
        })
    }
}
