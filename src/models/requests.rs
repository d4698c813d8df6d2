//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::Tags;

/// Longest key the HTTP surface accepts, in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for the SET operation (PUT /:namespace/set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: Value,
    /// Optional lifetime in milliseconds (one day if absent)
    #[serde(default)]
    pub expire: Option<u64>,
    /// A single tag or a list of tags
    #[serde(default)]
    pub tags: Tags,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for the TAGRM operation (POST /:namespace/tagrm)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagRemoveRequest {
    /// Tag to invalidate, the whole namespace when absent
    #[serde(default)]
    pub tag: Option<String>,
    /// Milliseconds to push the invalidation instant into the future
    #[serde(default)]
    pub delay: Option<i64>,
    /// Push the update to the keeper immediately
    #[serde(default)]
    pub flush: bool,
}

/// Checks a key taken from a body or a path.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    None
}
