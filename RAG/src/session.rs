//! Per-session transcripts and the turn handler that feeds them.

use crate::config::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL_SECS};
use crate::error::{RagError, Result};
use crate::models::{TranscriptEntry, TurnOutcome};
use crate::query_service::QueryService;
use crate::transcript::Transcript;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

pub type SharedTranscript = Arc<Mutex<Transcript>>;

struct SessionSlot {
    transcript: SharedTranscript,
    last_used: Instant,
}

impl SessionSlot {
    /// A session is busy while a turn or read holds its transcript lock.
    fn is_busy(&self) -> bool {
        self.transcript.try_lock().is_err()
    }
}

/// Registry of live chat sessions. Each session owns its own transcript;
/// nothing is shared between sessions and nothing outlives the process.
///
/// Sessions idle for longer than `idle_ttl` are dropped, and the store never
/// holds more than `max_sessions` idle sessions: creating one past the cap
/// evicts the least recently used.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionSlot>>>,
    max_turns: Option<usize>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SessionStore {
    pub fn new(max_turns: Option<usize>) -> Self {
        Self {
            sessions: Arc::default(),
            max_turns,
            idle_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let slot = SessionSlot {
            transcript: Arc::new(Mutex::new(Transcript::with_max_turns(self.max_turns))),
            last_used: Instant::now(),
        };

        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions);
        sessions.insert(id, slot);
        log::info!("Created chat session {} ({} live)", id, sessions.len());
        id
    }

    /// Drops expired sessions, then least recently used ones until there is
    /// room for one more. Busy sessions are never evicted.
    fn evict(&self, sessions: &mut HashMap<Uuid, SessionSlot>) {
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, slot| now.duration_since(slot.last_used) < self.idle_ttl || slot.is_busy());

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(_, slot)| !slot.is_busy())
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => {
                    log::warn!("Session cap of {} reached with every session busy", self.max_sessions);
                    break;
                }
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            log::info!("Evicted {} chat sessions", evicted);
        }
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<SharedTranscript> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.get_mut(&id)?;
        slot.last_used = Instant::now();
        Some(slot.transcript.clone())
    }

    pub async fn entries(&self, id: Uuid) -> Result<Vec<TranscriptEntry>> {
        let transcript = self.get(id).await.ok_or(RagError::SessionNotFound(id))?;
        let entries = transcript.lock().await.entries().to_vec();
        Ok(entries)
    }

    /// Clears the transcript but keeps the session.
    pub async fn reset(&self, id: Uuid) -> Result<()> {
        let transcript = self.get(id).await.ok_or(RagError::SessionNotFound(id))?;
        transcript.lock().await.clear();
        log::info!("Reset chat session {}", id);
        Ok(())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Runs user turns against the answer pipeline and records them.
#[derive(Clone)]
pub struct ChatService {
    query_service: Arc<QueryService>,
    sessions: SessionStore,
}

impl ChatService {
    pub fn new(query_service: Arc<QueryService>, sessions: SessionStore) -> Self {
        Self {
            query_service,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Answers `query` and appends the turn to the session's transcript.
    ///
    /// The session lock is held for the whole turn, so turns within one
    /// session never interleave. A generation failure is recorded as an
    /// error entry and reported through `TurnOutcome::failed`; it is not
    /// returned as `Err`. The query is recorded exactly as typed; whitespace
    /// only matters for rejecting blank input.
    pub async fn run_turn(&self, session_id: Uuid, query: &str) -> Result<TurnOutcome> {
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let transcript = self
            .sessions
            .get(session_id)
            .await
            .ok_or(RagError::SessionNotFound(session_id))?;
        let mut transcript = transcript.lock().await;

        let start_time = std::time::Instant::now();
        let (answer, failed) = match self.query_service.answer(query).await {
            Ok(answer) => {
                transcript.append_turn(query, &answer);
                (answer, false)
            }
            Err(e) => {
                log::error!("Turn failed in session {}: {}", session_id, e);
                let message = format!("Error generating answer: {e}");
                transcript.append_failed_turn(query, &message);
                (message, true)
            }
        };
        let processing_time = start_time.elapsed().as_millis();

        log::info!(
            "Session {} turn finished in {} ms (failed: {})",
            session_id,
            processing_time,
            failed
        );

        Ok(TurnOutcome {
            answer,
            failed,
            entries: transcript.entries().to_vec(),
            processing_time_ms: processing_time,
        })
    }
}
