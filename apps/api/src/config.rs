use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if `ANTHROPIC_API_KEY` is missing or a numeric variable is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub llm_max_attempts: u32,
    pub llm_backoff_ms: u64,
    pub highlight_ms: i64,
    pub session_ttl_minutes: i64,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_max_attempts: env_or("LLM_MAX_ATTEMPTS", 3)?,
            llm_backoff_ms: env_or("LLM_BACKOFF_MS", 1000)?,
            highlight_ms: env_or("HIGHLIGHT_MS", 3000)?,
            session_ttl_minutes: env_or("SESSION_TTL_MINUTES", 60)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
        };

        anyhow::ensure!(config.llm_max_attempts >= 1, "LLM_MAX_ATTEMPTS must be at least 1");
        anyhow::ensure!(config.session_ttl_minutes >= 1, "SESSION_TTL_MINUTES must be at least 1");
        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
