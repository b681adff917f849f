use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cache::CacheConfig;
use crate::gateway::{BackoffPolicy, GatewayConfig};
use crate::llm_client::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub model: String,
    pub ai_timeout: Duration,
    pub max_retries: u32,
    pub worker_pool_size: usize,
    pub retry_pause: Duration,
    pub rate_limit_pause: Duration,
    pub analysis_cache_ttl: Duration,
    pub interview_cache_ttl: Duration,
    pub insights_cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub cache_eviction_batch: usize,
    pub frontend_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            groq_api_url: std::env::var("GROQ_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            model: std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ai_timeout: Duration::from_secs(env_or("AI_TIMEOUT_SECONDS", 60)?),
            max_retries: env_or("MAX_RETRIES", 2)?,
            worker_pool_size: env_or("AI_WORKER_POOL_SIZE", 4)?,
            retry_pause: Duration::from_millis(env_or("RETRY_PAUSE_MS", 1000)?),
            rate_limit_pause: Duration::from_millis(env_or("RATE_LIMIT_PAUSE_MS", 2000)?),
            analysis_cache_ttl: Duration::from_secs(env_or("ANALYSIS_CACHE_TTL_SECONDS", 600)?),
            interview_cache_ttl: Duration::from_secs(env_or(
                "INTERVIEW_CACHE_TTL_SECONDS",
                600,
            )?),
            insights_cache_ttl: Duration::from_secs(env_or(
                "CAREER_INSIGHTS_CACHE_TTL_SECONDS",
                900,
            )?),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", 100)?,
            cache_eviction_batch: env_or("CACHE_EVICTION_BATCH", 20)?,
            frontend_url: std::env::var("FRONTEND_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            port: env_or("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would leave the gateway unable to complete a call.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.ai_timeout >= Duration::from_secs(1),
            "AI_TIMEOUT_SECONDS must be at least 1"
        );
        anyhow::ensure!(self.worker_pool_size >= 1, "AI_WORKER_POOL_SIZE must be at least 1");
        anyhow::ensure!(self.cache_max_entries >= 1, "CACHE_MAX_ENTRIES must be at least 1");
        Ok(())
    }

    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            model: self.model.clone(),
            timeout: self.ai_timeout,
            max_retries: self.max_retries,
            worker_pool_size: self.worker_pool_size,
            backoff: BackoffPolicy {
                retry_pause: self.retry_pause,
                rate_limit_pause: self.rate_limit_pause,
            },
        }
    }

    pub fn analysis_cache(&self) -> CacheConfig {
        CacheConfig::new(
            self.analysis_cache_ttl,
            self.cache_max_entries,
            self.cache_eviction_batch,
        )
    }

    pub fn interview_cache(&self) -> CacheConfig {
        CacheConfig::new(
            self.interview_cache_ttl,
            self.cache_max_entries,
            self.cache_eviction_batch,
        )
    }

    pub fn insights_cache(&self) -> CacheConfig {
        CacheConfig::new(
            self.insights_cache_ttl,
            self.cache_max_entries,
            self.cache_eviction_batch,
        )
    }
}

#[cfg(test)]
impl Config {
    /// Defaults matching an unset environment, with a dummy key.
    pub fn for_tests() -> Self {
        Config {
            groq_api_key: "test-key".to_string(),
            groq_api_url: "http://localhost:0/unused".to_string(),
            model: "test-model".to_string(),
            ai_timeout: Duration::from_secs(60),
            max_retries: 2,
            worker_pool_size: 4,
            retry_pause: Duration::from_secs(1),
            rate_limit_pause: Duration::from_secs(2),
            analysis_cache_ttl: Duration::from_secs(600),
            interview_cache_ttl: Duration::from_secs(600),
            insights_cache_ttl: Duration::from_secs(900),
            cache_max_entries: 100,
            cache_eviction_batch: 20,
            frontend_url: None,
            port: 8000,
            rust_log: "info".to_string(),
        }
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
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
