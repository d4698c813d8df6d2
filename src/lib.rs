//! Tag Cache - a pluggable-backend cache with tag invalidation
//!
//! Adds per-entry expiration and bulk invalidation by tag on top of any
//! key-value store, keeping tag invalidations consistent across instances
//! through a shared keeper.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{
    Backend, CacheHit, CacheInstance, CacheRegistry, DeleteScope, Keeper, MemoryKeeper,
    MemoryStore, Tags,
};
pub use config::{CacheOptions, Config};
pub use error::{BackendError, CacheError, KeeperError};
pub use tasks::{spawn_cleanup_task, SyncReport};
