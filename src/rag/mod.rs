//! Retrieval-augmented generation: segmentation, indexing, retrieval and
//! grounded prompt composition.

pub mod chunker;
pub mod indexer;
pub mod models;
pub mod prompt;
pub mod retriever;

pub use indexer::Indexer;
pub use prompt::Composer;
pub use retriever::Retriever;

#[cfg(test)]
pub(crate) mod testing {
    //! Stub providers shared by the pipeline tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::providers::{
        ChunkPoint, EmbedIntent, EmbeddingError, EmbeddingProvider, GenerationError,
        GenerationProvider, GenerationRequest, ScoredPoint, VectorStore, VectorStoreError,
    };

    /// Returns a constant vector per text and records intents and call count.
    pub struct StubEmbedder {
        pub fail: bool,
        pub calls: AtomicUsize,
        pub intents: Mutex<Vec<EmbedIntent>>,
    }

    impl StubEmbedder {
        pub fn new() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
                intents: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(
            &self,
            texts: &[String],
            intent: EmbedIntent,
        ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.intents.lock().unwrap().push(intent);
            if self.fail {
                return Err(EmbeddingError::Upstream {
                    status: 500,
                    message: "stub embedder failure".to_string(),
                });
            }
            Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3]).collect())
        }
    }

    /// In-memory store recording recreations and upserts; search serves a
    /// preset result list or a forced error.
    pub struct StubStore {
        pub recreated: AtomicUsize,
        pub points: Mutex<Vec<ChunkPoint>>,
        pub search_results: Mutex<Vec<ScoredPoint>>,
        pub fail_search: bool,
    }

    impl StubStore {
        pub fn new() -> Self {
            Self {
                recreated: AtomicUsize::new(0),
                points: Mutex::new(Vec::new()),
                search_results: Mutex::new(Vec::new()),
                fail_search: false,
            }
        }

        pub fn with_results(results: Vec<ScoredPoint>) -> Self {
            let store = Self::new();
            *store.search_results.lock().unwrap() = results;
            store
        }

        pub fn failing_search() -> Self {
            Self {
                fail_search: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl VectorStore for StubStore {
        async fn recreate_collection(&self, _dimension: u32) -> Result<(), VectorStoreError> {
            self.recreated.fetch_add(1, Ordering::SeqCst);
            self.points.lock().unwrap().clear();
            Ok(())
        }

        async fn upsert(&self, points: Vec<ChunkPoint>) -> Result<(), VectorStoreError> {
            self.points.lock().unwrap().extend(points);
            Ok(())
        }

        async fn search(
            &self,
            _vector: &[f32],
            limit: usize,
        ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
            if self.fail_search {
                return Err(VectorStoreError::Upstream {
                    status: 503,
                    message: "stub store offline".to_string(),
                });
            }
            let results = self.search_results.lock().unwrap();
            Ok(results.iter().take(limit).cloned().collect())
        }

        async fn point_count(&self) -> Result<u64, VectorStoreError> {
            Ok(self.points.lock().unwrap().len() as u64)
        }
    }

    /// Echoes the full message it was given, prefixed so tests can inspect
    /// the composed prompt.
    pub struct EchoGenerator;

    #[async_trait]
    impl GenerationProvider for EchoGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            Ok(format!("{}\n\n{}", request.system, request.message))
        }
    }

    /// Emits the fixed refusal sentence when the prompt carries the
    /// empty-context marker, otherwise a canned answer.
    pub struct ContextAwareGenerator;

    #[async_trait]
    impl GenerationProvider for ContextAwareGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            if request.message.contains(super::prompt::EMPTY_CONTEXT_MARKER) {
                Ok(format!("  {}  ", super::prompt::REFUSAL_SENTENCE))
            } else {
                Ok("Grounded answer.".to_string())
            }
        }
    }
}
