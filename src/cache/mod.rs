//! Cache Module
//!
//! Namespaced cache instances with per-entry expiration and tag-based
//! invalidation over a pluggable backend.

mod backend;
mod codec;
mod entry;
mod envelope;
mod instance;
mod keeper;
mod key_index;
mod lru;
mod memory;
mod registry;
mod stats;
mod store;
mod tags;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{Backend, DeleteScope};
pub use codec::{EntryCodec, Payload};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use envelope::{Envelope, Tags, Verdict};
pub use instance::{normalize_namespace, CacheHit, CacheInstance, DEFAULT_EXPIRE_MS};
pub use keeper::{Keeper, MemoryKeeper};
pub use key_index::{key_index, namespaced_index};
pub use lru::LruTracker;
pub use memory::{MemoryStore, DEFAULT_CAPACITY};
pub use registry::CacheRegistry;
pub use stats::{CacheStats, LookupStats};
pub use store::CacheStore;
pub use tags::{TagState, GLOBAL_TAG};

// == Public Constants ==
/// Maximum payload size accepted by the in-memory backend, in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
