use crate::error::GenerationError;
use crate::models::*;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// A hosted text-generation endpoint.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `messages` to `model` and returns the generated text unmodified.
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String, GenerationError>;
}

/// Groq's OpenAI-compatible chat completions API. Any endpoint speaking the
/// same `/chat/completions` dialect works through `base_url`.
pub struct GroqService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GroqService {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for GroqService {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest { model, messages };

        log::debug!("Sending {} messages to {}", messages.len(), model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(GenerationError::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(GenerationError::Unauthorized)
            }
            status if !status.is_success() => {
                let error_text = response.text().await.unwrap_or_default();
                log::warn!("Completion endpoint returned {}: {}", status, error_text);
                return Err(GenerationError::Api {
                    status: status.as_u16(),
                    message: error_text,
                });
            }
            _ => {}
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("no choices in response".to_string()))
    }
}
