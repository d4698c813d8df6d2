//! Keeper Module
//!
//! The shared authority for tag invalidation instants.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::KeeperError;

/// External holder of the global tag → invalidation instant map.
#[async_trait]
pub trait Keeper: Send + Sync {
    /// Publishes one tag invalidation.
    async fn write(&self, tag: &str, instant: u64) -> Result<(), KeeperError>;

    /// Returns the tags whose instant is at or after `since`.
    async fn load(&self, since: u64) -> Result<HashMap<String, u64>, KeeperError>;
}

// == Memory Keeper ==
/// Keeper living in this process, shared between instances through an `Arc`.
///
/// Keeps the newest instant per tag.
#[derive(Debug, Default)]
pub struct MemoryKeeper {
    tags: RwLock<HashMap<String, u64>>,
}

impl MemoryKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current instant recorded for `tag`.
    pub async fn instant(&self, tag: &str) -> Option<u64> {
        self.tags.read().await.get(tag).copied()
    }
}

#[async_trait]
impl Keeper for MemoryKeeper {
    async fn write(&self, tag: &str, instant: u64) -> Result<(), KeeperError> {
        let mut tags = self.tags.write().await;
        let current = tags.entry(tag.to_string()).or_insert(instant);
        *current = (*current).max(instant);
        Ok(())
    }

    async fn load(&self, since: u64) -> Result<HashMap<String, u64>, KeeperError> {
        let tags = self.tags.read().await;
        Ok(tags
            .iter()
            .filter(|(_, instant)| **instant >= since)
            .map(|(tag, &instant)| (tag.clone(), instant))
            .collect())
    }
}
