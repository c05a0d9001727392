//! Cohere REST adapter for embeddings and generation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::RagConfig;

use super::{
    EmbedIntent, EmbeddingError, EmbeddingProvider, GenerationError, GenerationProvider,
    GenerationRequest,
};

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";

/// Client for the Cohere embed and generate endpoints.
pub struct CohereClient {
    client: Client,
    base_url: String,
    api_key: String,
    embedding_model: String,
    llm_model: String,
}

impl CohereClient {
    pub fn new(api_key: String, config: &RagConfig) -> Result<Self, reqwest::Error> {
        Self::with_base_url(api_key, config, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a non-default endpoint (local proxies, tests).
    pub fn with_base_url(
        api_key: String,
        config: &RagConfig,
        base_url: String,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            embedding_model: config.embedding_model.clone(),
            llm_model: config.llm_model.clone(),
        })
    }
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Deserialize)]
struct Generation {
    text: String,
}

#[async_trait]
impl EmbeddingProvider for CohereClient {
    async fn embed(
        &self,
        texts: &[String],
        intent: EmbedIntent,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/v1/embed", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "texts": texts,
                "model": self.embedding_model,
                "input_type": intent.as_str(),
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Upstream {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: EmbedResponse = response.json().await?;
        if body.embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                got: body.embeddings.len(),
            });
        }

        Ok(body.embeddings)
    }
}

#[async_trait]
impl GenerationProvider for CohereClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        // The generate endpoint takes a single prompt; the invariant system
        // instruction is carried at the top of it.
        let prompt = format!("{}\n\n{}", request.system, request.message);

        let response = self
            .client
            .post(format!("{}/v1/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.llm_model,
                "prompt": prompt,
                "max_tokens": request.max_tokens,
                "temperature": request.temperature,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: GenerateResponse = response.json().await?;
        body.generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or(GenerationError::Empty)
    }
}
