//! Runtime settings, read from the process environment.
//!
//! `dotenv` is applied by the binaries before [`Settings::from_env`] runs, so a
//! `.env` file next to the binary works the same as exported variables.

use crate::error::{RagError, Result};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "qwen/qwen3-32b";
pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";
pub const DEFAULT_TENANT: &str = "default_tenant";
pub const DEFAULT_DATABASE: &str = "default_database";
pub const DEFAULT_COLLECTION: &str = "spacex_data";
/// Ollama's OpenAI-compatible endpoint.
pub const DEFAULT_EMBEDDING_API_URL: &str = "http://localhost:11434/v1";
/// all-MiniLM-L6-v2, the model Chroma embeds documents with by default.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct ChromaSettings {
    pub url: String,
    pub tenant: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub model: String,
    pub chroma: ChromaSettings,
    pub embedding: EmbeddingSettings,
    pub top_k: usize,
    pub http_timeout: Duration,
    /// Retention cap in turns; `None` keeps the whole session.
    pub max_turns: Option<usize>,
    pub session_ttl: Duration,
    pub max_sessions: usize,
    pub bind_addr: SocketAddr,
    pub api_token: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let groq_api_key = get("GROQ_API_KEY")
            .ok_or_else(|| RagError::Config("GROQ_API_KEY environment variable not set".to_string()))?;

        let top_k = parse_or(&get, "NOVA_TOP_K", DEFAULT_TOP_K)?;
        if top_k == 0 {
            return Err(RagError::Config("NOVA_TOP_K must be at least 1".to_string()));
        }

        let timeout_secs: u64 = parse_or(&get, "NOVA_HTTP_TIMEOUT_SECS", 60)?;

        let max_turns: usize = parse_or(&get, "NOVA_MAX_TURNS", 0)?;
        if max_turns > usize::MAX / 2 {
            return Err(RagError::Config(format!("NOVA_MAX_TURNS {max_turns} is too large")));
        }

        let ttl_secs: u64 = parse_or(&get, "NOVA_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let max_sessions: usize = parse_or(&get, "NOVA_MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?;
        if ttl_secs == 0 || max_sessions == 0 {
            return Err(RagError::Config(
                "NOVA_SESSION_TTL_SECS and NOVA_MAX_SESSIONS must be at least 1".to_string(),
            ));
        }

        let bind_addr = parse_or(&get, "NOVA_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        Ok(Self {
            groq_api_key,
            groq_api_url: base_url(get("GROQ_API_URL"), DEFAULT_GROQ_API_URL),
            model: get("NOVA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            chroma: ChromaSettings {
                url: base_url(get("CHROMA_URL"), DEFAULT_CHROMA_URL),
                tenant: get("CHROMA_TENANT").unwrap_or_else(|| DEFAULT_TENANT.to_string()),
                database: get("CHROMA_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                collection: get("CHROMA_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            },
            embedding: EmbeddingSettings {
                api_url: base_url(get("EMBEDDING_API_URL"), DEFAULT_EMBEDDING_API_URL),
                api_key: get("EMBEDDING_API_KEY"),
                model: get("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            },
            top_k,
            http_timeout: Duration::from_secs(timeout_secs),
            max_turns: (max_turns > 0).then_some(max_turns),
            session_ttl: Duration::from_secs(ttl_secs),
            max_sessions,
            bind_addr,
            api_token: get("NOVA_API_TOKEN"),
        })
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .as_deref()
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| RagError::Config(format!("invalid {key} value {raw:?}: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let s = settings(&[("GROQ_API_KEY", "gsk_test")]).unwrap();
        assert_eq!(s.model, DEFAULT_MODEL);
        assert_eq!(s.chroma.url, DEFAULT_CHROMA_URL);
        assert_eq!(s.chroma.tenant, "default_tenant");
        assert_eq!(s.chroma.database, "default_database");
        assert_eq!(s.chroma.collection, "spacex_data");
        assert_eq!(s.embedding.api_url, DEFAULT_EMBEDDING_API_URL);
        assert_eq!(s.embedding.model, DEFAULT_EMBEDDING_MODEL);
        assert!(s.embedding.api_key.is_none());
        assert_eq!(s.top_k, 3);
        assert_eq!(s.groq_api_url, DEFAULT_GROQ_API_URL);
        assert!(s.max_turns.is_none());
        assert_eq!(s.http_timeout, Duration::from_secs(60));
        assert_eq!(s.session_ttl, Duration::from_secs(3600));
        assert_eq!(s.max_sessions, DEFAULT_MAX_SESSIONS);
        assert_eq!(s.bind_addr.port(), 3000);
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = settings(&[]).unwrap_err();
        assert!(matches!(err, RagError::Config(msg) if msg.contains("GROQ_API_KEY")));

        let err = settings(&[("GROQ_API_KEY", "  ")]).unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn overrides_are_parsed() {
        let s = settings(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("GROQ_API_URL", "http://localhost:9000/v1/"),
            ("CHROMA_TENANT", "nova"),
            ("CHROMA_DATABASE", "space"),
            ("NOVA_TOP_K", "5"),
            ("NOVA_MAX_TURNS", "10"),
            ("NOVA_SESSION_TTL_SECS", "120"),
            ("NOVA_MAX_SESSIONS", "50"),
            ("NOVA_BIND_ADDR", "127.0.0.1:8080"),
            ("EMBEDDING_API_URL", "https://api.openai.com/v1/"),
            ("EMBEDDING_MODEL", "text-embedding-3-small"),
        ])
        .unwrap();
        assert_eq!(s.groq_api_url, "http://localhost:9000/v1");
        assert_eq!(s.chroma.tenant, "nova");
        assert_eq!(s.chroma.database, "space");
        assert_eq!(s.top_k, 5);
        assert_eq!(s.max_turns, Some(10));
        assert_eq!(s.session_ttl, Duration::from_secs(120));
        assert_eq!(s.max_sessions, 50);
        assert_eq!(s.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(s.embedding.api_url, "https://api.openai.com/v1");
        assert_eq!(s.embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(settings(&[("GROQ_API_KEY", "k"), ("NOVA_TOP_K", "three")]).is_err());
        assert!(settings(&[("GROQ_API_KEY", "k"), ("NOVA_TOP_K", "0")]).is_err());
        assert!(settings(&[("GROQ_API_KEY", "k"), ("NOVA_BIND_ADDR", "nowhere")]).is_err());
        assert!(settings(&[("GROQ_API_KEY", "k"), ("NOVA_MAX_SESSIONS", "0")]).is_err());
        assert!(settings(&[("GROQ_API_KEY", "k"), ("NOVA_SESSION_TTL_SECS", "0")]).is_err());
    }

    #[test]
    fn oversized_turn_cap_is_rejected() {
        let huge = usize::MAX.to_string();
        let err = settings(&[("GROQ_API_KEY", "k"), ("NOVA_MAX_TURNS", &huge)]).unwrap_err();
        assert!(matches!(err, RagError::Config(msg) if msg.contains("NOVA_MAX_TURNS")));
    }
}
