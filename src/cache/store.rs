//! Cache Store Module
//!
//! Capacity-bounded slot map combining HashMap storage with LRU tracking and
//! TTL expiration. Sits behind `MemoryStore`.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CacheStats, LruTracker, Payload, MAX_VALUE_SIZE};
use crate::error::BackendError;

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    /// Slot storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of slots allowed
    max_entries: usize,
    /// TTL in seconds used when the caller gives no hint
    default_ttl: Option<u64>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` slots.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity, at least one slot is always kept
    /// * `default_ttl` - TTL in seconds for slots stored without a hint
    pub fn new(max_entries: usize, default_ttl: Option<u64>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a payload, overwriting and resetting the TTL of an existing slot.
    ///
    /// At capacity, the least recently used slot is evicted first.
    pub fn set(
        &mut self,
        key: String,
        payload: Payload,
        ttl: Option<u64>,
    ) -> Result<(), BackendError> {
        if payload.size_hint() > MAX_VALUE_SIZE {
            return Err(BackendError::Rejected(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted_key) => {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(BackendError::Rejected(
                        "Store is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        let entry = CacheEntry::new(payload, ttl.or(self.default_ttl));
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the payload if present and not expired.
    ///
    /// Expired slots are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Payload> {
        let payload = match self.entries.get(key) {
            Some(entry) if entry.is_expired() => None,
            Some(entry) => Some(entry.payload.clone()),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        match payload {
            Some(payload) => {
                self.stats.record_hit();
                self.lru.touch(key);
                Some(payload)
            }
            None => {
                self.remove(key);
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Drops a single slot. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let existed = self.entries.remove(key).is_some();
        self.lru.remove(key);
        self.stats.set_total_entries(self.entries.len());
        existed
    }

    // == Flush ==
    /// Drops every slot, returning how many were held.
    pub fn flush(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.stats.record_flush();
        self.stats.set_total_entries(0);
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired slots, returning the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.entries.remove(&key);
            self.lru.remove(&key);
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
