pub mod config;
pub mod embedding_service;
pub mod error;
pub mod groq_service;
pub mod models;
pub mod postprocess;
pub mod query_service;
pub mod session;
pub mod transcript;
pub mod vector_store;

pub use config::Settings;
pub use embedding_service::EmbeddingService;
pub use error::{GenerationError, RagError, Result};
pub use groq_service::{CompletionClient, GroqService};
pub use models::*;
pub use query_service::QueryService;
pub use session::{ChatService, SessionStore};
pub use transcript::Transcript;
pub use vector_store::{ChromaStore, VectorStore};

use reqwest::Client;
use std::sync::Arc;

/// Wires the collaborator clients and the answer pipeline from settings.
pub fn build_chat_service(settings: &Settings) -> Result<ChatService> {
    log::info!("Initializing Nova RAG pipeline...");

    let client = Client::builder()
        .timeout(settings.http_timeout)
        .build()
        .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))?;

    log::info!(
        "Embedding queries with {} via {}",
        settings.embedding.model,
        settings.embedding.api_url
    );
    let embedder = EmbeddingService::new(client.clone(), settings.embedding.clone());
    let store = ChromaStore::new(client.clone(), settings.chroma.clone(), embedder);

    let groq = GroqService::new(client, &settings.groq_api_url, &settings.groq_api_key);
    let query_service = QueryService::new(
        Arc::new(store),
        Arc::new(groq),
        &settings.model,
        settings.top_k,
    );

    log::info!(
        "Nova ready: model {}, collection {} at {}, top {}",
        settings.model,
        settings.chroma.collection,
        settings.chroma.url,
        settings.top_k
    );

    let sessions = SessionStore::new(settings.max_turns)
        .with_idle_ttl(settings.session_ttl)
        .with_max_sessions(settings.max_sessions);
    Ok(ChatService::new(Arc::new(query_service), sessions))
}
