//! Error types for the retrieval and generation flow.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("The model returned an empty answer")]
    EmptyAnswer,

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("rate limited by completion endpoint")]
    RateLimited,

    #[error("completion endpoint rejected the API key")]
    Unauthorized,

    #[error("completion endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request to completion endpoint failed: {0}")]
    Http(String),

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, RagError>;
