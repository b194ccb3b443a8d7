use crate::config::EmbeddingSettings;
use crate::error::{RagError, Result};
use crate::models::*;
use reqwest::Client;

/// Client for an OpenAI-compatible `/embeddings` endpoint. Queries must be
/// embedded with the same model the collection's documents were.
pub struct EmbeddingService {
    client: Client,
    settings: EmbeddingSettings,
}

impl EmbeddingService {
    pub fn new(client: Client, settings: EmbeddingSettings) -> Self {
        Self { client, settings }
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.settings.api_url);
        let request = EmbeddingRequest {
            model: &self.settings.model,
            input: vec![query],
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("{status}: {error_text}")));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("failed to parse response: {e}")))?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| RagError::Embedding("response contained no embedding".to_string()))?;

        log::debug!("Embedded query into {} dimensions", embedding.len());
        Ok(embedding)
    }
}
