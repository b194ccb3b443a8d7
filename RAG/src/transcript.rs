use crate::models::{Speaker, TranscriptEntry};

/// Ordered log of one chat session. Entries are only ever appended in
/// (User, Assistant) pairs and never edited afterwards.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    max_turns: Option<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `max_turns` turns, dropping the oldest whole turn first.
    pub fn with_max_turns(max_turns: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            max_turns: max_turns.filter(|n| *n > 0),
        }
    }

    pub fn append_turn(&mut self, query: &str, answer: &str) {
        self.push_pair(query, answer, false);
    }

    /// Records a turn whose answer could not be generated.
    pub fn append_failed_turn(&mut self, query: &str, error: &str) {
        self.push_pair(query, error, true);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push_pair(&mut self, query: &str, reply: &str, is_error: bool) {
        self.entries.reserve(2);
        self.entries.push(TranscriptEntry {
            speaker: Speaker::User,
            text: query.to_string(),
            is_error: false,
        });
        self.entries.push(TranscriptEntry {
            speaker: Speaker::Assistant,
            text: reply.to_string(),
            is_error,
        });

        if let Some(max_turns) = self.max_turns {
            let max_entries = max_turns.saturating_mul(2);
            if self.entries.len() > max_entries {
                let excess = self.entries.len() - max_entries;
                self.entries.drain(..excess);
            }
        }
    }
}
