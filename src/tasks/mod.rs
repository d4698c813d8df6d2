//! Background Tasks Module
//!
//! # Tasks
//! - Tag sync: publishes and pulls tag invalidations against a keeper
//! - TTL Cleanup: sweeps expired slots from the in-memory backend

mod cleanup;
mod tag_sync;

pub use cleanup::spawn_cleanup_task;
pub use tag_sync::{spawn_tag_sync_task, SyncReport, TagSyncEngine};
