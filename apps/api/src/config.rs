use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_WEBSITE_FETCH_MAX_BYTES: usize = 100_000;

/// Application configuration loaded from environment variables.
/// Nothing is strictly required: a missing API key is reported on every LLM call,
/// and a missing database URL selects in-memory persistence.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Hard per-request timeout.
    pub request_timeout: Duration,
    /// Cap on fetched HTML handed to the website analysis prompt.
    pub website_fetch_max_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            database_url: optional_env("DATABASE_URL"),
            port: parse_env("PORT", DEFAULT_PORT)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(parse_env(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            website_fetch_max_bytes: parse_env(
                "WEBSITE_FETCH_MAX_BYTES",
                DEFAULT_WEBSITE_FETCH_MAX_BYTES,
            )?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            database_url: None,
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            website_fetch_max_bytes: DEFAULT_WEBSITE_FETCH_MAX_BYTES,
        }
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
