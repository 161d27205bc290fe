//! Configuration management for Flightdesk
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Base URL of the OpenAI-compatible completion API
    pub llm_api_url: String,
    /// Bearer credential for the completion API
    pub llm_api_key: String,
    /// Model identifier sent with every completion request
    pub llm_model: String,
    /// Completion token cap
    pub llm_max_tokens: u32,
    /// Overall deadline for a single relay (open + stream)
    pub relay_timeout_seconds: u64,

    /// MySQL connection URL. In-memory records are used when unset.
    pub database_url: Option<String>,
    /// JSON seed file for the in-memory record store
    pub seed_file: Option<String>,

    /// Redis connection URL for sessions. In-memory sessions are used when unset.
    pub redis_url: Option<String>,
    /// Session lifetime (in seconds)
    pub session_ttl_seconds: u64,

    /// Panel login
    pub admin_username: String,
    pub admin_password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("FLIGHTDESK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("FLIGHTDESK_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Invalid FLIGHTDESK_PORT")?,

            llm_api_url: env::var("LLM_API_URL").unwrap_or_else(|_| {
                "https://dashscope-intl.aliyuncs.com/compatible-mode/v1".to_string()
            }),
            llm_api_key: env::var("LLM_API_KEY").context("LLM_API_KEY must be set")?,
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "qwen-turbo".to_string()),
            llm_max_tokens: env::var("LLM_MAX_TOKENS")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()
                .context("Invalid LLM_MAX_TOKENS")?,
            relay_timeout_seconds: env::var("RELAY_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .context("Invalid RELAY_TIMEOUT_SECONDS")?,

            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            seed_file: env::var("SEED_FILE").ok().filter(|v| !v.is_empty()),

            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            session_ttl_seconds: env::var("SESSION_TTL_SECONDS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .context("Invalid SESSION_TTL_SECONDS")?,

            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
        })
    }

    /// Relay deadline as a `Duration`
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_seconds)
    }
}
