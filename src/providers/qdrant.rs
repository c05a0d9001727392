//! Qdrant REST adapter for the vector store boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::rag::models::ChunkPayload;

use super::{ChunkPoint, ScoredPoint, VectorStore, VectorStoreError};

/// Client for one named Qdrant collection.
pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
}

impl QdrantStore {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        collection: String,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            collection,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    fn collection_path(&self) -> String {
        format!("/collections/{}", self.collection)
    }

    async fn check(response: Response) -> Result<Response, VectorStoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(VectorStoreError::Upstream {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    score: f32,
    payload: Option<ChunkPayload>,
}

#[derive(Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    points_count: Option<u64>,
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn recreate_collection(&self, dimension: u32) -> Result<(), VectorStoreError> {
        let path = self.collection_path();

        let existing = self.request(Method::GET, &path).send().await?;
        match existing.status() {
            StatusCode::NOT_FOUND => {}
            status if status.is_success() => {
                log::warn!("collection '{}' already exists, recreating", self.collection);
                let deleted = self.request(Method::DELETE, &path).send().await?;
                Self::check(deleted).await?;
            }
            status => {
                return Err(VectorStoreError::Upstream {
                    status: status.as_u16(),
                    message: existing.text().await.unwrap_or_default(),
                });
            }
        }

        let created = self
            .request(Method::PUT, &path)
            .json(&json!({
                "vectors": { "size": dimension, "distance": "Cosine" }
            }))
            .send()
            .await?;
        Self::check(created).await?;

        log::info!("created collection '{}' (dim {dimension})", self.collection);
        Ok(())
    }

    async fn upsert(&self, points: Vec<ChunkPoint>) -> Result<(), VectorStoreError> {
        let path = format!("{}/points?wait=true", self.collection_path());

        let response = self
            .request(Method::PUT, &path)
            .json(&json!({ "points": points }))
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        let path = format!("{}/points/search", self.collection_path());

        let response = self
            .request(Method::POST, &path)
            .json(&json!({
                "vector": vector,
                "limit": limit,
                "with_payload": true,
            }))
            .send()
            .await?;
        let response = Self::check(response).await?;

        let body: SearchResponse = response.json().await?;
        let mut points = Vec::with_capacity(body.result.len());
        for hit in body.result {
            match hit.payload {
                Some(payload) => points.push(ScoredPoint {
                    score: hit.score,
                    payload,
                }),
                None => log::warn!("dropping search hit without payload (score {})", hit.score),
            }
        }

        Ok(points)
    }

    async fn point_count(&self) -> Result<u64, VectorStoreError> {
        let response = self
            .request(Method::GET, &self.collection_path())
            .send()
            .await?;
        let response = Self::check(response).await?;

        let body: CollectionInfoResponse = response.json().await?;
        Ok(body.result.points_count.unwrap_or(0))
    }
}
