//! Configuration Module
//!
//! Per-namespace cache options plus the server configuration loaded from
//! environment variables.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default period of the tag sync cycle (ms)
pub const DEFAULT_TAG_FLUSH_INTERVAL: u64 = 5_000;

/// Default width of the tag pull window (ms), 7 days
pub const DEFAULT_TAG_MAX_EXPIRE_TIME: u64 = 7 * 86_400_000;

// == Cache Options ==
/// Options recognised by a cache instance.
///
/// Deserializing merges the given fields over the defaults. Unknown fields are
/// accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Period of the tag publish/pull cycle in milliseconds
    pub tag_flush_interval: u64,
    /// How far back (ms) the first tag pull reaches
    pub tag_max_expire_time: u64,
}

impl CacheOptions {
    /// Builds options from a loosely-typed JSON object.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            tag_flush_interval: DEFAULT_TAG_FLUSH_INTERVAL,
            tag_max_expire_time: DEFAULT_TAG_MAX_EXPIRE_TIME,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of the default in-memory backend
    pub max_entries: usize,
    /// TTL in seconds applied by the in-memory backend when no hint is given
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Expired-entry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Options handed to every namespace the server creates
    pub cache: CacheOptions,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - In-memory backend capacity (default: 2000)
    /// - `DEFAULT_TTL` - Fallback TTL in seconds (default: 86400)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `TAG_FLUSH_INTERVAL` - Tag sync period in ms (default: 5000)
    /// - `TAG_MAX_EXPIRE_TIME` - Tag pull window in ms (default: 7 days)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            cache: CacheOptions {
                tag_flush_interval: env_or("TAG_FLUSH_INTERVAL", defaults.cache.tag_flush_interval),
                tag_max_expire_time: env_or(
                    "TAG_MAX_EXPIRE_TIME",
                    defaults.cache.tag_max_expire_time,
                ),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 2000,
            default_ttl: 86_400,
            server_port: 3000,
            cleanup_interval: 1,
            cache: CacheOptions::default(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
