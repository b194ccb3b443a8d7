use serde::Deserialize;

/// A user turn, posted either as JSON or from the chat page's form.
#[derive(Debug, Deserialize)]
pub struct QueryPayload {
    pub query: String,
}
