//! In-memory cache implementation
//!
//! Stands in for Redis when no Redis URL is configured (single-process
//! deployments and tests). Values are stored as JSON, like in Redis, so both
//! backends accept the same types.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

/// Entry in the in-memory cache with expiration
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| Instant::now() > exp).unwrap_or(false)
    }
}

/// In-memory cache with TTL-based expiration
///
/// Expired entries are hidden from reads and swept on insert.
pub struct InMemoryCache {
    data: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, HashMap<String, CacheEntry>>> {
        self.data
            .read()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("cache lock poisoned")))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, HashMap<String, CacheEntry>>> {
        self.data
            .write()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("cache lock poisoned")))
    }

    /// Get a value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let data = self.read()?;

        match data.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(serde_json::from_str(&entry.value)?)),
            _ => Ok(None),
        }
    }

    /// Set a value in cache with a TTL. A TTL of zero never expires.
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let serialized = serde_json::to_string(value)?;
        let expires_at = if ttl_seconds > 0 {
            Some(Instant::now() + Duration::from_secs(ttl_seconds))
        } else {
            None
        };

        let mut data = self.write()?;
        data.retain(|_, entry| !entry.is_expired());
        data.insert(
            key.to_string(),
            CacheEntry {
                value: serialized,
                expires_at,
            },
        );
        Ok(())
    }

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.write()?.remove(key);
        Ok(())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.read()
            .map(|data| data.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}
