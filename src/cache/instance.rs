//! Cache Instance Module
//!
//! The façade bound to one namespace: envelopes in and out of the backend,
//! checked against the tag state kept in sync with a keeper.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{
    current_timestamp_ms, namespaced_index, Backend, DeleteScope, EntryCodec, Envelope, Keeper,
    LookupStats, TagState, Tags, Verdict, GLOBAL_TAG,
};
use crate::config::CacheOptions;
use crate::error::Result;
use crate::tasks::{spawn_tag_sync_task, SyncReport, TagSyncEngine};

/// Lifetime given to entries stored without an explicit one (1 day).
pub const DEFAULT_EXPIRE_MS: u64 = 86_400_000;

// == Cache Hit ==
/// A value served from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub value: Value,
    /// Milliseconds until the entry expires
    pub ttl_ms: u64,
}

impl CacheHit {
    /// Deserializes the payload into `T`.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.value)?)
    }
}

/// Trims and lowercases a namespace name.
pub fn normalize_namespace(namespace: &str) -> String {
    namespace.trim().to_lowercase()
}

// == Cache Instance ==
pub struct CacheInstance {
    namespace: String,
    backend: Arc<dyn Backend>,
    codec: EntryCodec,
    options: CacheOptions,
    tags: Arc<RwLock<TagState>>,
    sync: Option<Arc<TagSyncEngine>>,
    sync_task: Mutex<Option<JoinHandle<()>>>,
    stats: RwLock<LookupStats>,
}

impl CacheInstance {
    // == Constructor ==
    /// Builds an instance and, when a keeper is given, starts its sync task.
    ///
    /// # Panics
    /// Panics when `keeper` is set and no Tokio runtime is running, as the
    /// sync task is spawned right away.
    pub fn new(
        namespace: &str,
        backend: Arc<dyn Backend>,
        keeper: Option<Arc<dyn Keeper>>,
        options: CacheOptions,
    ) -> Self {
        let namespace = normalize_namespace(namespace);
        let codec = EntryCodec::for_backend(backend.in_process());
        let watermark = current_timestamp_ms().saturating_sub(options.tag_max_expire_time);
        let tags = Arc::new(RwLock::new(TagState::new(watermark)));

        let sync = keeper.map(|keeper| {
            Arc::new(TagSyncEngine::new(
                namespace.clone(),
                tags.clone(),
                keeper,
                options.tag_max_expire_time,
            ))
        });
        let sync_task = sync
            .as_ref()
            .map(|engine| spawn_tag_sync_task(engine.clone(), options.tag_flush_interval));

        info!(
            "[{}] Cache instance created (codec: {:?}, keeper: {})",
            namespace,
            codec,
            sync.is_some()
        );

        Self {
            namespace,
            backend,
            codec,
            options,
            tags,
            sync,
            sync_task: Mutex::new(sync_task),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    fn index(&self, key: &str) -> String {
        namespaced_index(&self.namespace, key)
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// # Arguments
    /// * `key` - Cache key within this namespace
    /// * `value` - Any serializable value, converted without touching the original
    /// * `expire_ms` - Lifetime in ms, `None` or zero for one day
    /// * `tags` - A single tag or a list of tags
    pub async fn set<T, G>(
        &self,
        key: &str,
        value: &T,
        expire_ms: Option<u64>,
        tags: G,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
        G: Into<Tags>,
    {
        let value = serde_json::to_value(value)?;
        let expire_ms = expire_ms.filter(|ms| *ms > 0).unwrap_or(DEFAULT_EXPIRE_MS);
        let envelope = Envelope::new(key, value, current_timestamp_ms(), expire_ms, tags.into());
        let payload = self.codec.encode(envelope)?;

        // whole seconds, rounded up so the backend never drops the entry early
        let ttl_hint = expire_ms.div_ceil(1000);
        self.backend.set(&self.index(key), payload, Some(ttl_hint)).await?;
        Ok(())
    }

    // == Get ==
    /// Reads `key`.
    ///
    /// Returns `Ok(None)` when the key is absent, unparseable, expired,
    /// belongs to a colliding key or was invalidated through one of its tags.
    /// Envelopes missing required fields are an error.
    pub async fn get(&self, key: &str) -> Result<Option<CacheHit>> {
        let payload = match self.backend.get(&self.index(key)).await? {
            Some(payload) => payload,
            None => {
                self.stats.write().await.record_absent();
                return Ok(None);
            }
        };

        let (verdict, value) = match self.codec.decode(payload)? {
            Some(envelope) => {
                let now = current_timestamp_ms();
                let verdict = envelope.verdict(key, now, &*self.tags.read().await);
                (verdict, envelope.value)
            }
            None => (Verdict::Corrupt, Value::Null),
        };

        self.stats.write().await.record(&verdict);
        match verdict {
            Verdict::Valid { ttl_ms } => Ok(Some(CacheHit { value, ttl_ms })),
            miss => {
                debug!("[{}] Miss for '{}': {:?}", self.namespace, key, miss);
                Ok(None)
            }
        }
    }

    /// Reads `key` and deserializes the payload into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(hit) => hit.parse().map(Some),
            None => Ok(None),
        }
    }

    // == Unset ==
    /// Deletes `key` from the backend.
    ///
    /// Backends that cannot delete a single key flush everything and report
    /// `DeleteScope::All`.
    pub async fn unset(&self, key: &str) -> Result<DeleteScope> {
        let scope = self.backend.delete(&self.index(key)).await?;
        if scope == DeleteScope::All {
            info!("[{}] Unset of '{}' flushed the whole backend", self.namespace, key);
        }
        Ok(scope)
    }

    // == Tag Remove ==
    /// Invalidates every entry carrying `tag` (the whole namespace when
    /// `None`) written at or before `now + delay_ms`.
    ///
    /// Takes effect locally at once; other instances see it after the next
    /// sync. With `force_flush` the update is also pushed to the keeper in
    /// the background. Returns the invalidation instant in effect for the tag.
    pub async fn tagrm(&self, tag: Option<&str>, delay_ms: Option<i64>, force_flush: bool) -> u64 {
        let tag = tag
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(GLOBAL_TAG)
            .to_string();
        let delay = delay_ms.unwrap_or(0).max(0) as u64;
        let requested = current_timestamp_ms().saturating_add(delay);

        let instant = {
            let mut state = self.tags.write().await;
            state.invalidate(&tag, requested, self.sync.is_some());
            state.instant(&tag).unwrap_or(requested)
        };
        debug!("[{}] Tag '{}' invalidated at {}", self.namespace, tag, instant);

        if force_flush {
            if let Some(engine) = &self.sync {
                let engine = engine.clone();
                tokio::spawn(async move { engine.publish_one(&tag, instant).await });
            }
        }

        instant
    }

    // == Sync ==
    /// Runs one publish/pull cycle now. `None` without a keeper.
    pub async fn sync_now(&self) -> Option<SyncReport> {
        match &self.sync {
            Some(engine) => Some(engine.run_cycle().await),
            None => None,
        }
    }

    /// Stops the sync task and makes one last attempt to publish pending
    /// updates.
    pub async fn shutdown(&self) -> Option<SyncReport> {
        if let Some(handle) = self.sync_task.lock().await.take() {
            handle.abort();
        }
        let report = self.sync_now().await;
        info!("[{}] Cache instance shut down", self.namespace);
        report
    }

    // == Accessors ==
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn codec(&self) -> EntryCodec {
        self.codec
    }

    pub fn has_keeper(&self) -> bool {
        self.sync.is_some()
    }

    /// Invalidation instant currently known for `tag`.
    pub async fn tag_instant(&self, tag: &str) -> Option<u64> {
        self.tags.read().await.instant(tag)
    }

    /// Number of tag updates not yet accepted by the keeper.
    pub async fn pending_updates(&self) -> usize {
        self.tags.read().await.pending_len()
    }

    pub async fn stats(&self) -> LookupStats {
        self.stats.read().await.clone()
    }
}

impl Drop for CacheInstance {
    fn drop(&mut self) {
        if let Some(handle) = self.sync_task.get_mut().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for CacheInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheInstance")
            .field("namespace", &self.namespace)
            .field("codec", &self.codec)
            .field("options", &self.options)
            .field("keeper", &self.sync.is_some())
            .finish()
    }
}
