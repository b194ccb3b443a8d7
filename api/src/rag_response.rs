use nova_rag::TranscriptEntry;
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub session_id: Uuid,
    pub entries: Vec<TranscriptEntry>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}
