//! Online retrieval: query embedding, nearest-neighbor search and grounding
//! context assembly.

use std::sync::Arc;

use crate::providers::{EmbedIntent, EmbeddingError, EmbeddingProvider, ScoredPoint, VectorStore};

use super::models::{RetrievedChunk, SourceRef};

/// Synthetic provenance for a user-pinned excerpt.
pub const PINNED_SOURCE: &str = "user_selection";

/// Synthetic score forcing a pinned excerpt to rank first.
pub const PINNED_SCORE: f32 = 1.0;

/// Turns one query into an ordered list of retrieved chunks.
///
/// Stateless per request; any number of retrievals may run concurrently
/// against a read-only collection snapshot.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Retrieve the grounding context for `query`.
    ///
    /// An embedding failure propagates; a search failure degrades to an
    /// empty result list so the generation step still runs and produces the
    /// canned refusal instead of an error. A pinned excerpt is prepended
    /// unconditionally with maximal score, outside the top-K budget.
    pub async fn retrieve(
        &self,
        query: &str,
        pinned: Option<&str>,
    ) -> Result<Vec<RetrievedChunk>, EmbeddingError> {
        let queries = [query.to_string()];
        let vector = self
            .embedder
            .embed(&queries, EmbedIntent::Query)
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch {
                expected: 1,
                got: 0,
            })?;

        let mut results = match self.store.search(&vector, self.top_k).await {
            Ok(points) => points.into_iter().map(from_point).collect(),
            Err(err) => {
                log::error!("vector search failed, continuing with empty context: {err}");
                Vec::new()
            }
        };

        if let Some(text) = pinned {
            results.insert(
                0,
                RetrievedChunk {
                    text: text.to_string(),
                    score: PINNED_SCORE,
                    metadata: SourceRef {
                        source: PINNED_SOURCE.to_string(),
                        chapter: "N/A".to_string(),
                        section: "N/A".to_string(),
                    },
                },
            );
        }

        Ok(results)
    }
}

fn from_point(point: ScoredPoint) -> RetrievedChunk {
    let unknown = || "unknown".to_string();
    RetrievedChunk {
        text: point.payload.text,
        score: point.score,
        metadata: SourceRef {
            source: point.payload.source.unwrap_or_else(unknown),
            chapter: point.payload.chapter.unwrap_or_else(unknown),
            section: point.payload.section.unwrap_or_else(unknown),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{EmbedIntent, ScoredPoint};
    use crate::rag::models::ChunkPayload;
    use crate::rag::testing::{StubEmbedder, StubStore};

    fn point(text: &str, score: f32, source: &str) -> ScoredPoint {
        ScoredPoint {
            score,
            payload: ChunkPayload {
                text: text.to_string(),
                source: Some(source.to_string()),
                module: Some("Module 1".to_string()),
                chapter: Some("Physical AI".to_string()),
                section: Some("Overview".to_string()),
                file: Some("chapter-1.md".to_string()),
                size: Some(text.len()),
            },
        }
    }

    #[tokio::test]
    async fn test_results_are_mapped_best_first() {
        let store = Arc::new(StubStore::with_results(vec![
            point("ROS 2 is a middleware framework.", 0.92, "docs/module-1/chapter-1.md"),
            point("Actuators convert energy.", 0.71, "docs/module-1/chapter-2.md"),
        ]));
        let embedder = Arc::new(StubEmbedder::new());
        let retriever = Retriever::new(embedder.clone(), store, 5);

        let results = retriever.retrieve("What is ROS 2?", None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, 0.92);
        assert_eq!(results[0].metadata.source, "docs/module-1/chapter-1.md");
        assert_eq!(results[0].metadata.chapter, "Physical AI");

        let intents = embedder.intents.lock().unwrap();
        assert_eq!(*intents, vec![EmbedIntent::Query]);
    }

    #[tokio::test]
    async fn test_pinned_excerpt_ranks_first() {
        let store = Arc::new(StubStore::with_results(vec![point(
            "Stored chunk.",
            0.99,
            "docs/module-1/chapter-1.md",
        )]));
        let retriever = Retriever::new(Arc::new(StubEmbedder::new()), store, 5);

        let results = retriever
            .retrieve("query", Some("The user highlighted this passage."))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "The user highlighted this passage.");
        assert_eq!(results[0].score, PINNED_SCORE);
        assert_eq!(results[0].metadata.source, PINNED_SOURCE);
        assert_eq!(results[1].text, "Stored chunk.");
    }

    #[tokio::test]
    async fn test_search_failure_degrades_to_empty() {
        let retriever = Retriever::new(
            Arc::new(StubEmbedder::new()),
            Arc::new(StubStore::failing_search()),
            5,
        );

        let results = retriever.retrieve("query", None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_still_honors_pinned_excerpt() {
        let retriever = Retriever::new(
            Arc::new(StubEmbedder::new()),
            Arc::new(StubStore::failing_search()),
            5,
        );

        let results = retriever.retrieve("query", Some("pinned")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.source, PINNED_SOURCE);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let retriever = Retriever::new(
            Arc::new(StubEmbedder::failing()),
            Arc::new(StubStore::new()),
            5,
        );

        assert!(retriever.retrieve("query", None).await.is_err());
    }
}
