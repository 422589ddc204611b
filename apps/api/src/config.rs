use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_LLM_MODEL: &str = "llama3.1:8b";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    /// LLM calls allowed per variant before the fallback clamp.
    pub generation_max_attempts: usize,
    pub auto_append_hashtags: bool,
    /// JSON array of persona records. No personas are loaded when unset.
    pub personas_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Config {
            llm_base_url: lookup("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_temperature: parse_or(&lookup, "LLM_TEMPERATURE", 0.7)?,
            llm_timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?,
            generation_max_attempts: parse_or(&lookup, "GENERATION_MAX_ATTEMPTS", 4)?,
            auto_append_hashtags: parse_or(&lookup, "AUTO_APPEND_HASHTAGS", true)?,
            personas_path: lookup("PERSONAS_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if config.generation_max_attempts == 0 {
            bail!("GENERATION_MAX_ATTEMPTS must be at least 1");
        }
        if !(0.0..=2.0).contains(&config.llm_temperature) {
            bail!(
                "LLM_TEMPERATURE must be between 0.0 and 2.0, got {}",
                config.llm_temperature
            );
        }

        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
