//! Cache Statistics Module
//!
//! Counters for the in-memory store and for per-namespace lookups.

use serde::Serialize;

use crate::cache::Verdict;

// == Store Stats ==
/// Counters kept by the in-memory store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that found a live slot
    pub hits: u64,
    /// Lookups that found nothing or an expired slot
    pub misses: u64,
    /// Slots dropped to respect capacity
    pub evictions: u64,
    /// Whole-store flushes triggered by deletes
    pub flushes: u64,
    /// Current number of slots
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.hits + self.misses)
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_flush(&mut self) {
        self.flushes += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Lookup Stats ==
/// Outcome counters of `get` calls on one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    pub hits: u64,
    /// Backend had nothing under the key
    pub absent: u64,
    pub expired: u64,
    pub key_mismatches: u64,
    pub invalidated: u64,
    pub corrupt: u64,
}

impl LookupStats {
    pub fn record_absent(&mut self) {
        self.absent += 1;
    }

    pub fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Valid { .. } => self.hits += 1,
            Verdict::Expired => self.expired += 1,
            Verdict::KeyMismatch => self.key_mismatches += 1,
            Verdict::Invalidated { .. } => self.invalidated += 1,
            Verdict::Corrupt => self.corrupt += 1,
        }
    }

    pub fn misses(&self) -> u64 {
        self.absent + self.expired + self.key_mismatches + self.invalidated + self.corrupt
    }

    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.hits + self.misses())
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
