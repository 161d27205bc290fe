//! Redis cache implementation
//!
//! Holds session records as JSON strings with a TTL.

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppResult;

/// Redis cache wrapper
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Create a new Redis cache
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self { conn }
    }

    /// Connect to the given Redis URL
    pub async fn connect(redis_url: &str) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = redis::aio::ConnectionManager::new(client).await?;
        Ok(Self::new(conn))
    }

    /// Get a value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    /// Set a value in cache with a TTL
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let serialized = serde_json::to_string(value)?;
        let _: () = conn.set_ex(key, serialized, ttl_seconds).await?;
        Ok(())
    }

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    /// Round-trip a PING
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

/// Cache key prefixes
pub mod keys {
    /// Session record key, addressed by the hash of the session token
    pub fn session(token_hash: &str) -> String {
        format!("flightdesk:session:{}", token_hash)
    }
}
