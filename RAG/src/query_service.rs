use crate::error::{RagError, Result};
use crate::groq_service::CompletionClient;
use crate::models::*;
use crate::postprocess::clean_answer;
use crate::vector_store::VectorStore;
use std::sync::Arc;

pub const SYSTEM_PROMPT: &str = r#"You are Nova, an expert AI assistant for SpaceX, Starlink, and modern space technology.
- Answer only the question; no reasoning, no explanations.
- Be concise, clear, friendly, and professional.
- Use retrieved context if available.
- Include sources if relevant."#;

/// Retrieves context for a question, asks the model, and cleans the reply.
pub struct QueryService {
    vector_store: Arc<dyn VectorStore>,
    completion: Arc<dyn CompletionClient>,
    model: String,
    top_k: usize,
}

impl QueryService {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        completion: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            vector_store,
            completion,
            model: model.into(),
            top_k,
        }
    }

    pub async fn answer(&self, query: &str) -> Result<String> {
        let passages = self.retrieve(query).await;
        let context = build_context(&passages);
        let messages = build_messages(&context, query);

        let raw_answer = self.completion.complete(&self.model, &messages).await?;

        let answer = clean_answer(&raw_answer);
        if answer.is_empty() {
            return Err(RagError::EmptyAnswer);
        }
        Ok(answer)
    }

    /// Retrieval never fails a turn; the model just gets no context.
    async fn retrieve(&self, query: &str) -> Vec<String> {
        match self.vector_store.query(query, self.top_k).await {
            Ok(passages) => passages,
            Err(e) => {
                log::warn!("Retrieval failed, answering without context: {}", e);
                Vec::new()
            }
        }
    }
}

/// Joins passages in rank order, one per line.
pub fn build_context(passages: &[String]) -> String {
    passages.join("\n")
}

pub fn build_messages(context: &str, query: &str) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(build_prompt(context, query)),
    ]
}

fn build_prompt(context: &str, query: &str) -> String {
    format!(
        r#"
Context:
{context}

Question:
{query}

Instructions:
- You can reason internally if you want.
- BUT only provide the final answer in your output.
- Do NOT include internal reasoning or <think> blocks.
"#
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::GenerationError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub(crate) struct MockStore {
        pub result: std::result::Result<Vec<String>, String>,
        pub calls: Mutex<Vec<(String, usize)>>,
    }

    impl MockStore {
        pub fn returning(docs: &[&str]) -> Self {
            Self {
                result: Ok(docs.iter().map(|d| d.to_string()).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                result: Err("connection refused".to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VectorStore for MockStore {
        async fn query(&self, text: &str, top_k: usize) -> Result<Vec<String>> {
            self.calls.lock().unwrap().push((text.to_string(), top_k));
            self.result.clone().map_err(RagError::Retrieval)
        }
    }

    /// Replays scripted replies in order and records every request.
    pub(crate) struct MockCompletion {
        pub replies: Mutex<Vec<std::result::Result<String, GenerationError>>>,
        pub requests: Mutex<Vec<(String, Vec<Message>)>>,
    }

    impl MockCompletion {
        pub fn new(replies: Vec<std::result::Result<String, GenerationError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }
    }

    #[async_trait]
    impl CompletionClient for MockCompletion {
        async fn complete(
            &self,
            model: &str,
            messages: &[Message],
        ) -> std::result::Result<String, GenerationError> {
            self.requests
                .lock()
                .unwrap()
                .push((model.to_string(), messages.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(GenerationError::Http("no scripted reply".to_string())))
        }
    }

    fn service(store: Arc<MockStore>, completion: Arc<MockCompletion>) -> QueryService {
        QueryService::new(store, completion, "qwen/qwen3-32b", 3)
    }

    #[test]
    fn context_preserves_rank_order() {
        let passages = vec!["b ranked first".to_string(), "a ranked second".to_string(), "c".to_string()];
        assert_eq!(build_context(&passages), "b ranked first\na ranked second\nc");
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn messages_are_system_then_user() {
        let messages = build_messages("some context", "What is Falcon 9?");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::system(SYSTEM_PROMPT));
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("Context:\nsome context\n"));
        assert!(messages[1].content.contains("Question:\nWhat is Falcon 9?\n"));
    }

    #[tokio::test]
    async fn starlink_answer_passes_through_unchanged() {
        let store = Arc::new(MockStore::returning(&["Starlink is a satellite internet constellation."]));
        let completion = Arc::new(MockCompletion::replying(
            "Starlink is SpaceX's satellite internet service.",
        ));

        let answer = service(store.clone(), completion.clone())
            .answer("What is Starlink?")
            .await
            .unwrap();

        assert_eq!(answer, "Starlink is SpaceX's satellite internet service.");
        assert_eq!(
            store.calls.lock().unwrap().as_slice(),
            &[("What is Starlink?".to_string(), 3)]
        );
        let requests = completion.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "qwen/qwen3-32b");
        assert!(requests[0].1[1]
            .content
            .contains("Starlink is a satellite internet constellation."));
    }

    #[tokio::test]
    async fn empty_retrieval_still_generates() {
        let store = Arc::new(MockStore::returning(&[]));
        let completion = Arc::new(MockCompletion::replying("Some answer."));

        let answer = service(store, completion.clone()).answer("x").await.unwrap();

        assert_eq!(answer, "Some answer.");
        let requests = completion.requests.lock().unwrap();
        assert_eq!(requests[0].1[1].content, build_prompt("", "x"));
    }

    #[tokio::test]
    async fn retrieval_failure_degrades_to_empty_context() {
        let store = Arc::new(MockStore::failing());
        let completion = Arc::new(MockCompletion::replying("Still answered."));

        let answer = service(store, completion.clone()).answer("x").await.unwrap();

        assert_eq!(answer, "Still answered.");
        assert_eq!(completion.requests.lock().unwrap()[0].1[1].content, build_prompt("", "x"));
    }

    #[tokio::test]
    async fn reasoning_is_stripped_from_answer() {
        let store = Arc::new(MockStore::returning(&["ctx"]));
        let completion = Arc::new(MockCompletion::replying(
            "<think>internal steps</think>\nFinal answer text",
        ));

        let answer = service(store, completion).answer("q").await.unwrap();
        assert_eq!(answer, "Final answer text");
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let store = Arc::new(MockStore::returning(&["ctx"]));
        let completion = Arc::new(MockCompletion::new(vec![Err(GenerationError::RateLimited)]));

        let err = service(store, completion).answer("q").await.unwrap_err();
        assert!(matches!(err, RagError::Generation(GenerationError::RateLimited)));
    }

    #[tokio::test]
    async fn reasoning_only_reply_is_an_empty_answer() {
        let store = Arc::new(MockStore::returning(&[]));
        let completion = Arc::new(MockCompletion::replying("<think>hmm</think>"));

        let err = service(store, completion).answer("q").await.unwrap_err();
        assert!(matches!(err, RagError::EmptyAnswer));
    }
}
