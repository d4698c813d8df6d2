//! Tag State Module
//!
//! Process-local view of tag invalidation instants, the updates still waiting
//! to reach the keeper, and the watermark bounding the next pull.

use std::collections::HashMap;

/// Implicit tag carried by every entry; invalidating it clears a namespace.
pub const GLOBAL_TAG: &str = "__global__";

// == Tag State ==
#[derive(Debug, Clone, Default)]
pub struct TagState {
    /// Last known invalidation instant per tag
    instants: HashMap<String, u64>,
    /// Local invalidations not yet confirmed by the keeper
    pending: HashMap<String, u64>,
    /// Lower bound for the next keeper load
    watermark: u64,
}

impl TagState {
    // == Constructor ==
    /// Creates an empty state whose first pull starts at `watermark`.
    pub fn new(watermark: u64) -> Self {
        Self {
            instants: HashMap::new(),
            pending: HashMap::new(),
            watermark,
        }
    }

    /// Last known invalidation instant of `tag`.
    pub fn instant(&self, tag: &str) -> Option<u64> {
        self.instants.get(tag).copied()
    }

    // == Invalidate ==
    /// Records a local invalidation of `tag` at `instant`.
    ///
    /// Neither the known instant nor the pending one ever moves backwards.
    /// Returns `false` when a later invalidation was already known.
    pub fn invalidate(&mut self, tag: &str, instant: u64, track_pending: bool) -> bool {
        let advanced = raise(&mut self.instants, tag, instant);
        if track_pending {
            raise(&mut self.pending, tag, instant);
        }
        advanced
    }

    // == Pending ==
    /// Copy of every pending update, left in place until the keeper
    /// confirms it.
    pub fn pending_snapshot(&self) -> HashMap<String, u64> {
        self.pending.clone()
    }

    /// Drops `tag` from pending if it still holds exactly `instant`.
    ///
    /// A newer invalidation queued while the write was in flight stays
    /// pending.
    pub fn confirm_pending(&mut self, tag: &str, instant: u64) {
        if self.pending.get(tag) == Some(&instant) {
            self.pending.remove(tag);
        }
    }

    pub fn pending_instant(&self, tag: &str) -> Option<u64> {
        self.pending.get(tag).copied()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    // == Merge ==
    /// Folds a keeper snapshot into the local view, per-tag maximum.
    ///
    /// Returns how many tags moved forward. The watermark is left alone:
    /// a tag published late can carry an instant older than others already
    /// pulled.
    pub fn merge(&mut self, remote: &HashMap<String, u64>) -> usize {
        let mut advanced = 0;
        for (tag, instant) in remote {
            if raise(&mut self.instants, tag, *instant) {
                advanced += 1;
            }
        }
        advanced
    }

    /// Moves the watermark up to `floor`, never back.
    pub fn roll_watermark(&mut self, floor: u64) {
        self.watermark = self.watermark.max(floor);
    }

    pub fn watermark(&self) -> u64 {
        self.watermark
    }

    /// Number of tags with a known invalidation.
    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }
}

/// Stores `instant` under `tag` if it is newer than what is there.
fn raise(map: &mut HashMap<String, u64>, tag: &str, instant: u64) -> bool {
    match map.get_mut(tag) {
        Some(current) if *current >= instant => false,
        Some(current) => {
            *current = instant;
            true
        }
        None => {
            map.insert(tag.to_string(), instant);
            true
        }
    }
}
