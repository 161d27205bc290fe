//! Panel sessions
//!
//! A successful login creates a session record and hands the browser an opaque
//! random token in an `HttpOnly` cookie. The store only ever sees the SHA-256
//! of the token, so a leaked cache dump cannot be replayed as a cookie.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    cache::{redis::keys, InMemoryCache, RedisCache},
    error::AppResult,
};

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "flightdesk_session";

/// Cache backend abstraction for SessionStore
pub enum SessionCacheBackend {
    Redis(Arc<RedisCache>),
    InMemory(Arc<InMemoryCache>),
}

impl SessionCacheBackend {
    fn name(&self) -> &'static str {
        match self {
            SessionCacheBackend::Redis(_) => "redis",
            SessionCacheBackend::InMemory(_) => "in_memory",
        }
    }
}

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub username: String,
    /// Unix timestamp when the session was created
    pub created_at: i64,
}

/// Creates, resolves and destroys panel sessions
pub struct SessionStore {
    cache: SessionCacheBackend,
    ttl_seconds: u64,
}

impl SessionStore {
    pub fn new(cache: SessionCacheBackend, ttl_seconds: u64) -> Self {
        Self { cache, ttl_seconds }
    }

    /// Store backed by an in-process map
    pub fn in_memory(ttl_seconds: u64) -> Self {
        Self::new(
            SessionCacheBackend::InMemory(Arc::new(InMemoryCache::new())),
            ttl_seconds,
        )
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.name()
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Start a session and return its token
    #[instrument(skip(self))]
    pub async fn create(&self, username: &str) -> AppResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        let session = Session {
            username: username.to_string(),
            created_at: Utc::now().timestamp(),
        };
        let key = keys::session(&hash_token(&token));

        match &self.cache {
            SessionCacheBackend::Redis(cache) => {
                cache.set_with_ttl(&key, &session, self.ttl_seconds).await?
            }
            SessionCacheBackend::InMemory(cache) => {
                cache.set_with_ttl(&key, &session, self.ttl_seconds).await?;
                debug!(live_sessions = cache.len(), "In-memory session stored");
            }
        }

        debug!(backend = self.backend_name(), "Session created");
        Ok(token)
    }

    /// Resolve a token to its live session
    pub async fn get(&self, token: &str) -> AppResult<Option<Session>> {
        let key = keys::session(&hash_token(token));
        match &self.cache {
            SessionCacheBackend::Redis(cache) => cache.get(&key).await,
            SessionCacheBackend::InMemory(cache) => cache.get(&key).await,
        }
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn destroy(&self, token: &str) -> AppResult<()> {
        let key = keys::session(&hash_token(token));
        match &self.cache {
            SessionCacheBackend::Redis(cache) => cache.delete(&key).await,
            SessionCacheBackend::InMemory(cache) => cache.delete(&key).await,
        }
    }

    /// Backend connectivity check
    pub async fn ping(&self) -> AppResult<()> {
        match &self.cache {
            SessionCacheBackend::Redis(cache) => cache.ping().await,
            SessionCacheBackend::InMemory(_) => Ok(()),
        }
    }
}

/// Hash a session token for use as a store key
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Find the session token among the request's cookies
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

/// `Set-Cookie` value carrying a new session token
pub fn session_cookie(token: &str, max_age_seconds: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

/// `Set-Cookie` value that clears the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
