use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON file backing the feedback store; in-memory when unset.
    pub store_path: Option<PathBuf>,
    pub requires_comment: bool,
    pub submit_latency_ms: u64,
    /// Sessions untouched for this long are dropped from memory.
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            port: parse_or("PORT", lookup("PORT"), 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            store_path: lookup("FEEDBACK_STORE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            requires_comment: parse_or(
                "FEEDBACK_REQUIRES_COMMENT",
                lookup("FEEDBACK_REQUIRES_COMMENT"),
                true,
            )?,
            submit_latency_ms: parse_or(
                "FEEDBACK_SUBMIT_LATENCY_MS",
                lookup("FEEDBACK_SUBMIT_LATENCY_MS"),
                500,
            )?,
            session_idle_secs: parse_or(
                "FEEDBACK_SESSION_IDLE_SECS",
                lookup("FEEDBACK_SESSION_IDLE_SECS"),
                1800,
            )?,
        })
    }

    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
    }
}
