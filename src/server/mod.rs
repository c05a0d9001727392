//! HTTP service surface: health check and the question-answering endpoint.
//!
//! Providers are injected as trait handles; a missing credential leaves its
//! handle unset and the corresponding endpoints degrade (health reports it,
//! chat returns 503) rather than failing process start.

pub mod models;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::config::RagConfig;
use crate::providers::{
    EmbeddingError, EmbeddingProvider, GenerationError, GenerationProvider, VectorStore,
};
use crate::rag::{Composer, Retriever};

use models::{ChatRequest, ChatResponse, HealthResponse, ResponseMetadata, ServiceStatuses};

/// Shared service state. Read-only after startup; requests share nothing
/// mutable and may run fully in parallel.
pub struct AppState {
    pub config: RagConfig,
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub store: Option<Arc<dyn VectorStore>>,
    pub generator: Option<Arc<dyn GenerationProvider>>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} service not available")]
    NotConfigured(&'static str),

    #[error("invalid request: {0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Embedding(_) | ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            log::error!("chat request failed: {self}");
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/api/v1/health", get(health))
        .route("/api/v1/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Physical AI Textbook RAG API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cohere_up = state.embedder.is_some() && state.generator.is_some();
    let qdrant_up = state.store.is_some();

    let status_of = |up: bool| {
        if up { "connected" } else { "disconnected" }.to_string()
    };

    Json(HealthResponse {
        status: if cohere_up && qdrant_up {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: ServiceStatuses {
            cohere: status_of(cohere_up),
            qdrant: status_of(qdrant_up),
        },
    })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    // Validate before any network call.
    if request.query.trim().is_empty() {
        return Err(ApiError::InvalidInput("query must not be empty"));
    }

    let embedder = state
        .embedder
        .clone()
        .ok_or(ApiError::NotConfigured("Cohere"))?;
    let generator = state
        .generator
        .clone()
        .ok_or(ApiError::NotConfigured("Cohere"))?;
    let store = state.store.clone().ok_or(ApiError::NotConfigured("Qdrant"))?;

    log::info!("processing chat request: {}", request.query);

    let retriever = Retriever::new(embedder, store, state.config.top_k);
    let sources = retriever
        .retrieve(&request.query, request.selected_text_context.as_deref())
        .await?;

    let composer = Composer::new(generator, state.config.context_chunks);
    let answer = composer.answer(&request.query, &sources).await?;

    Ok(Json(ChatResponse {
        answer,
        metadata: ResponseMetadata {
            model: state.config.llm_model.clone(),
            chunks_used: sources.len(),
        },
        sources,
    }))
}
