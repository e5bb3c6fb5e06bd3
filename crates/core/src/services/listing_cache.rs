//! TTL cache in front of public listings.
//!
//! Cache failures never fail a request: reads fall through to the database
//! and write errors are logged.

use std::time::Duration;

use inkwell_common::SharedStore;
use serde::{Serialize, de::DeserializeOwned};

/// JSON values cached in the ephemeral store.
#[derive(Clone)]
pub struct ListingCache {
    store: SharedStore,
    ttl: Duration,
}

impl ListingCache {
    /// Create a cache with the given entry lifetime.
    #[must_use]
    pub const fn new(store: SharedStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Cached value, or `None` on a miss or any cache error.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Discarding unreadable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed");
                None
            }
        }
    }

    pub async fn put<T: Serialize + Sync>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.store.set(key, &raw, self.ttl).await {
            tracing::warn!(error = %e, key = %key, "Cache write failed");
        }
    }

    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(error = %e, key = %key, "Cache invalidation failed");
        } else {
            tracing::debug!(key = %key, "Invalidated cache entry");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkwell_common::{EphemeralStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_put_get_invalidate() {
        let cache = ListingCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(60));

        assert_eq!(cache.get::<Vec<String>>("k").await, None);

        cache.put("k", &vec!["a".to_string()]).await;
        assert_eq!(cache.get::<Vec<String>>("k").await, Some(vec!["a".to_string()]));

        cache.invalidate("k").await;
        assert_eq!(cache.get::<Vec<String>>("k").await, None);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store.set("k", "{not json", Duration::from_secs(60)).await.unwrap();

        let cache = ListingCache::new(store, Duration::from_secs(60));
        assert_eq!(cache.get::<Vec<String>>("k").await, None);
    }
}
