//! Backend Module
//!
//! The key-value store a cache instance persists envelopes into.

use async_trait::async_trait;
use serde::Serialize;

use crate::cache::Payload;
use crate::error::BackendError;

/// How much a `delete` actually removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteScope {
    /// Only the requested key
    Key,
    /// The whole store was flushed
    All,
}

/// Pluggable key-value store.
///
/// Implementations must be safe to share between instances and tasks. Keys
/// are already hashed and namespaced by the caller.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Stores `payload` under `key`. `ttl_secs` is an advisory expiry hint.
    async fn set(
        &self,
        key: &str,
        payload: Payload,
        ttl_secs: Option<u64>,
    ) -> Result<(), BackendError>;

    /// Fetches the payload under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Payload>, BackendError>;

    /// Removes `key`, reporting whether more than that key went away.
    async fn delete(&self, key: &str) -> Result<DeleteScope, BackendError>;

    /// Whether the store lives in this process and keeps payloads as
    /// structured values, making serialization unnecessary.
    fn in_process(&self) -> bool {
        false
    }
}
