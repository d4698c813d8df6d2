//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, DeleteScope, LookupStats};

/// Response body for the GET operation (GET /:namespace/get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
    /// Milliseconds until expiry
    pub ttl: u64,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value, ttl: u64) -> Self {
        Self {
            key: key.into(),
            value,
            ttl,
        }
    }
}

/// Response body for the SET operation (PUT /:namespace/set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /:namespace/del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
    /// Whether only the key or the whole backend was cleared
    pub scope: DeleteScope,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, scope: DeleteScope) -> Self {
        let key = key.into();
        let message = match scope {
            DeleteScope::Key => format!("Key '{}' deleted successfully", key),
            DeleteScope::All => format!("Key '{}' deleted by flushing the store", key),
        };
        Self { message, key, scope }
    }
}

/// Response body for the TAGRM operation (POST /:namespace/tagrm)
#[derive(Debug, Clone, Serialize)]
pub struct TagRemoveResponse {
    /// The tag that was invalidated
    pub tag: String,
    /// Invalidation instant (Unix milliseconds)
    pub instant: u64,
}

/// Per-namespace lookup counters
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceStats {
    pub namespace: String,
    #[serde(flatten)]
    pub lookups: LookupStats,
    pub hit_rate: f64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Counters of the shared in-memory backend
    pub store: CacheStats,
    /// Hit rate of the in-memory backend
    pub hit_rate: f64,
    /// Counters of every registered namespace
    pub namespaces: Vec<NamespaceStats>,
}

impl StatsResponse {
    pub fn new(store: CacheStats, namespaces: Vec<NamespaceStats>) -> Self {
        Self {
            hit_rate: store.hit_rate(),
            store,
            namespaces,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
