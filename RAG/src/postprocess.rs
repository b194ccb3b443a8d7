//! Removal of reasoning traces from raw model output.
//!
//! Reasoning models may emit `<think>...</think>` blocks despite being told
//! not to. Stripping them is a content heuristic, not a parser: anything the
//! model writes outside the delimiters is kept as the answer.

use regex::Regex;
use std::sync::OnceLock;

pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

fn think_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("static regex"))
}

/// Cleans a raw completion into the final answer shown to the user.
///
/// Idempotent: `clean_answer(&clean_answer(s)) == clean_answer(s)`.
pub fn clean_answer(raw: &str) -> String {
    strip_reasoning(raw).trim().to_string()
}

/// Drops paired reasoning blocks with their content, then any dangling
/// delimiter left by a truncated block.
pub fn strip_reasoning(raw: &str) -> String {
    let mut text = raw.to_string();

    // Removing one block can join the halves of another, so repeat.
    loop {
        let next = think_block().replace_all(&text, "").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    // Opener lost: everything up to the last closer is reasoning.
    if let Some(idx) = text.rfind(THINK_CLOSE) {
        text = text[idx + THINK_CLOSE.len()..].to_string();
    }

    // Closer never arrived: the tail is unfinished reasoning.
    if let Some(idx) = text.find(THINK_OPEN) {
        text.truncate(idx);
    }

    text
}
