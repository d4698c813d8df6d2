//! Memory Store Module
//!
//! Default backend: a bounded in-process store shared behind a lock.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{Backend, CacheStats, CacheStore, DeleteScope, Payload};
use crate::error::BackendError;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 2000;

// == Memory Store ==
/// Bounded in-memory backend.
///
/// Deleting any key flushes the whole pool; `delete` reports
/// `DeleteScope::All` so callers know more than one key went away.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<CacheStore>,
}

impl MemoryStore {
    /// Creates a store with `capacity` slots and no fallback TTL.
    pub fn new(capacity: usize) -> Self {
        Self::with_default_ttl(capacity, None)
    }

    /// Creates a store whose slots expire after `default_ttl` seconds when
    /// the caller gives no hint.
    pub fn with_default_ttl(capacity: usize, default_ttl: Option<u64>) -> Self {
        Self {
            inner: RwLock::new(CacheStore::new(capacity, default_ttl)),
        }
    }

    /// Drops expired slots, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl Backend for MemoryStore {
    async fn set(
        &self,
        key: &str,
        payload: Payload,
        ttl_secs: Option<u64>,
    ) -> Result<(), BackendError> {
        self.inner.write().await.set(key.to_string(), payload, ttl_secs)
    }

    async fn get(&self, key: &str) -> Result<Option<Payload>, BackendError> {
        // write lock: reads update recency and counters
        Ok(self.inner.write().await.get(key))
    }

    async fn delete(&self, key: &str) -> Result<DeleteScope, BackendError> {
        let flushed = self.inner.write().await.flush();
        debug!("Delete of {} flushed {} slots from memory store", key, flushed);
        Ok(DeleteScope::All)
    }

    fn in_process(&self) -> bool {
        true
    }
}
