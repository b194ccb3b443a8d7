//! Similarity search against the document collection.

use crate::config::ChromaSettings;
use crate::embedding_service::EmbeddingService;
use crate::error::{RagError, Result};
use crate::models::*;
use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::OnceCell;

/// A read-only document collection searchable by free text.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns the text of the `top_k` most relevant documents, best first.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<String>>;
}

/// Chroma collection reached over its v2 REST API. The server searches by
/// vector only, so every query is embedded through `embedder` first.
pub struct ChromaStore {
    client: Client,
    settings: ChromaSettings,
    collection_id: OnceCell<String>,
    embedder: EmbeddingService,
}

impl ChromaStore {
    pub fn new(client: Client, settings: ChromaSettings, embedder: EmbeddingService) -> Self {
        Self {
            client,
            settings,
            collection_id: OnceCell::new(),
            embedder,
        }
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.settings.url.trim_end_matches('/'),
            self.settings.tenant,
            self.settings.database
        )
    }

    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let request = ChromaCollectionRequest {
                    name: &self.settings.collection,
                    get_or_create: true,
                };

                let response = self
                    .client
                    .post(self.collections_url())
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| RagError::Retrieval(e.to_string()))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(RagError::Retrieval(format!(
                        "collection lookup returned {status}: {error_text}"
                    )));
                }

                let collection: ChromaCollection = response
                    .json()
                    .await
                    .map_err(|e| RagError::Retrieval(format!("failed to parse collection: {e}")))?;

                log::info!(
                    "Using Chroma collection {} ({})",
                    self.settings.collection,
                    collection.id
                );
                Ok::<_, RagError>(collection.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<String>> {
        let collection_id = self.collection_id().await?;
        let url = format!("{}/{}/query", self.collections_url(), collection_id);

        let request = ChromaQueryRequest {
            query_embeddings: vec![self.embedder.embed_query(text).await?],
            n_results: top_k,
            include: vec!["documents"],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Retrieval(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagError::Retrieval(format!("query returned {status}: {error_text}")));
        }

        let body: ChromaQueryResponse = response
            .json()
            .await
            .map_err(|e| RagError::Retrieval(format!("failed to parse query response: {e}")))?;

        // One query embedding in, so only the first result row matters.
        let documents: Vec<String> = body
            .documents
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect();

        log::info!("Retrieved {} documents", documents.len());
        Ok(documents)
    }
}
