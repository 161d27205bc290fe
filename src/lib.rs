//! Flightdesk - flight operations panel backend
//!
//! Serves the panel's session login, flight record management and the
//! AI insight endpoints, which stream a completion model's summary of the
//! active flights straight through to the browser.

pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod middleware;
pub mod prompts;
pub mod records;
pub mod relay;
pub mod routes;
pub mod session;
pub mod streaming;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

pub use crate::config::Config;
pub use crate::llm::{CompletionUpstream, OpenAiCompatibleClient};
pub use crate::records::{FlightStore, InMemoryFlightStore, MySqlFlightStore};
pub use crate::relay::CompletionRelay;
pub use crate::session::{SessionCacheBackend, SessionStore};

use crate::cache::RedisCache;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Flight, airline and airport records
    pub store: Arc<dyn FlightStore>,
    pub sessions: Arc<SessionStore>,
    /// Relay to the completion API
    pub relay: CompletionRelay,
}

impl AppState {
    /// Create a new application state, connecting the configured backends
    pub async fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn FlightStore> = match (&config.database_url, &config.seed_file) {
            (Some(url), _) => Arc::new(
                MySqlFlightStore::connect(url)
                    .await
                    .context("Failed to connect to MySQL")?,
            ),
            (None, Some(path)) => Arc::new(
                InMemoryFlightStore::from_seed_file(path)
                    .with_context(|| format!("Failed to load seed file {}", path))?,
            ),
            (None, None) => Arc::new(InMemoryFlightStore::new()),
        };
        info!(backend = store.name(), "Record store ready");

        let sessions = match &config.redis_url {
            Some(url) => {
                let cache = RedisCache::connect(url)
                    .await
                    .context("Failed to connect to Redis")?;
                SessionStore::new(
                    SessionCacheBackend::Redis(Arc::new(cache)),
                    config.session_ttl_seconds,
                )
            }
            None => SessionStore::in_memory(config.session_ttl_seconds),
        };
        info!(backend = sessions.backend_name(), "Session store ready");

        // No overall request timeout here: the relay deadline bounds streams.
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(16)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let upstream = Arc::new(OpenAiCompatibleClient::new(http_client, &config));

        Ok(Self::from_parts(config, store, Arc::new(sessions), upstream))
    }

    /// Assemble state from prebuilt parts
    pub fn from_parts(
        config: Config,
        store: Arc<dyn FlightStore>,
        sessions: Arc<SessionStore>,
        upstream: Arc<dyn CompletionUpstream>,
    ) -> Self {
        let relay = CompletionRelay::new(upstream, config.relay_timeout());

        Self {
            config,
            start_time: Instant::now(),
            store,
            sessions,
            relay,
        }
    }
}
