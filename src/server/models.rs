//! Request/response DTOs for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::rag::models::RetrievedChunk;

/// Body of `POST /api/v1/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's question. Must be non-blank.
    pub query: String,
    /// Optional text the user selected; forced to the front of the context.
    #[serde(default)]
    pub selected_text_context: Option<String>,
    /// Accepted for wire compatibility; not used by the prompt.
    #[serde(default)]
    pub conversation_history: Option<Vec<serde_json::Value>>,
}

/// Body of the chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<RetrievedChunk>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
pub struct ResponseMetadata {
    pub model: String,
    pub chunks_used: usize,
}

/// Body of `GET /api/v1/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceStatuses,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatuses {
    pub cohere: String,
    pub qdrant: String,
}
