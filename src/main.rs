//! HTTP API server entry point.

use std::sync::Arc;

use anyhow::Context;

use textbook_rag::config::Config;
use textbook_rag::providers::cohere::CohereClient;
use textbook_rag::providers::qdrant::QdrantStore;
use textbook_rag::providers::{EmbeddingProvider, GenerationProvider, VectorStore};
use textbook_rag::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env();

    let cohere = match &config.cohere_api_key {
        Some(key) => Some(Arc::new(CohereClient::new(key.clone(), &config.rag)?)),
        None => {
            log::warn!("COHERE_API_KEY not set, chat endpoint will report degraded");
            None
        }
    };

    let qdrant = match &config.qdrant_url {
        Some(url) => Some(Arc::new(QdrantStore::new(
            url.clone(),
            config.qdrant_api_key.clone(),
            config.rag.collection.clone(),
        )?)),
        None => {
            log::warn!("QDRANT_URL not set, retrieval will report degraded");
            None
        }
    };

    let state = Arc::new(AppState {
        config: config.rag,
        embedder: cohere.clone().map(|c| c as Arc<dyn EmbeddingProvider>),
        generator: cohere.map(|c| c as Arc<dyn GenerationProvider>),
        store: qdrant.map(|q| q as Arc<dyn VectorStore>),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    log::info!("listening on {}", config.bind_addr);

    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
