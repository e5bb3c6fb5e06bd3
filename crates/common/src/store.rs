//! Short-lived key/value storage.
//!
//! Used for email verification tokens and for the TTL cache in front of
//! public listings. Production deployments use Redis; the in-memory store
//! serves tests and single-instance setups with Redis disabled.
//!
//! # Example
//!
//! ```ignore
//! use inkwell_common::store::{RedisStore, EphemeralStore};
//! use std::time::Duration;
//!
//! let store = RedisStore::new(Arc::new(redis_client), "inkwell");
//! store.set("verify_email:abc", "user-id", Duration::from_secs(86400)).await?;
//! let user_id = store.take("verify_email:abc").await?;
//! ```

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{AppError, AppResult};

/// Shared handle to a store implementation.
pub type SharedStore = Arc<dyn EphemeralStore>;

/// TTL key/value store.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Read a value without consuming it.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Read and delete a value in one step (single-use tokens).
    async fn take(&self, key: &str) -> AppResult<Option<String>>;

    /// Delete a value.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Redis-backed store.
#[derive(Clone)]
pub struct RedisStore {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisStore {
    /// Create a new Redis store. All keys are namespaced with `prefix`.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: &str) -> Self {
        Self {
            redis,
            prefix: prefix.to_string(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }
}

#[async_trait]
impl EphemeralStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.redis
            .set::<(), _, _>(
                self.key(key),
                value,
                Some(Expiration::EX(ttl.as_secs().max(1) as i64)),
                None,
                false,
            )
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(key = %key, ttl_secs = ttl.as_secs(), "Stored ephemeral value");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.redis
            .get::<Option<String>, _>(self.key(key))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        self.redis
            .getdel::<Option<String>, _>(self.key(key))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.redis
            .del::<(), _>(self.key(key))
            .await
            .map_err(|e| AppError::Redis(e.to_string()))
    }
}

/// In-process store. Expired entries are dropped on read and swept on
/// every write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        Ok(entries
            .remove(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        // get does not consume
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_memory_store_take_is_single_use() {
        let store = MemoryStore::new();
        store.set("token", "user1", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.take("token").await.unwrap(), Some("user1".to_string()));
        assert_eq!(store.take("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_expiry() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_write_sweeps_expired_keys() {
        let store = MemoryStore::new();
        store.set("stale-1", "v", Duration::from_millis(10)).await.unwrap();
        store.set("stale-2", "v", Duration::from_millis(10)).await.unwrap();
        store.set("live", "v", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Never read again, only another key is written
        store.set("fresh", "v", Duration::from_secs(60)).await.unwrap();

        let entries = store.entries.lock().await;
        assert_eq!(entries.len(), 2);
        assert!(entries.contains_key("live"));
        assert!(entries.contains_key("fresh"));
    }

    #[tokio::test]
    async fn test_memory_store_delete() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_secs(60)).await.unwrap();
        store.delete("k").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
