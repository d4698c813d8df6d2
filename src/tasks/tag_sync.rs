//! Tag Sync Task
//!
//! Publishes local tag invalidations to the keeper and pulls the keeper's
//! global view back, on a fixed period.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{current_timestamp_ms, Keeper, TagState};

// == Sync Report ==
/// What one publish/pull cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Pending updates the keeper accepted
    pub published: usize,
    /// Pending updates kept for the next cycle after a failed write
    pub retained: usize,
    /// Tags moved forward by the pull, `None` when the load failed
    pub pulled: Option<usize>,
}

// == Tag Sync Engine ==
/// Reconciles one namespace's tag state with a keeper.
///
/// Cycles never overlap: the timer skips a tick while a cycle is running and
/// `run_cycle` waits for the running one to finish.
pub struct TagSyncEngine {
    namespace: String,
    tags: Arc<RwLock<TagState>>,
    keeper: Arc<dyn Keeper>,
    /// How far behind the clock the pull window starts, in ms
    window_ms: u64,
    in_flight: Mutex<()>,
}

impl TagSyncEngine {
    /// `window_ms` is the longest an entry can outlive an invalidation it
    /// has not yet seen; pulls always reach back that far.
    pub fn new(
        namespace: impl Into<String>,
        tags: Arc<RwLock<TagState>>,
        keeper: Arc<dyn Keeper>,
        window_ms: u64,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            tags,
            keeper,
            window_ms,
            in_flight: Mutex::new(()),
        }
    }

    /// Runs a full cycle, waiting for one already in flight to end first.
    pub async fn run_cycle(&self) -> SyncReport {
        let _guard = self.in_flight.lock().await;
        self.cycle().await
    }

    /// Runs a full cycle unless one is already in flight.
    pub async fn try_run_cycle(&self) -> Option<SyncReport> {
        let _guard = self.in_flight.try_lock().ok()?;
        Some(self.cycle().await)
    }

    async fn cycle(&self) -> SyncReport {
        let (published, retained) = self.publish().await;
        let pulled = self.pull().await;
        SyncReport {
            published,
            retained,
            pulled,
        }
    }

    // == Publish ==
    /// Writes every pending update to the keeper concurrently.
    ///
    /// Updates stay pending until their write succeeds, so a cycle cancelled
    /// mid-write loses nothing. Returns `(published, retained)`.
    async fn publish(&self) -> (usize, usize) {
        let pending = self.tags.read().await.pending_snapshot();
        if pending.is_empty() {
            return (0, 0);
        }

        let writes = pending.iter().map(|(tag, &instant)| async move {
            let result = self.keeper.write(tag, instant).await;
            (tag, instant, result)
        });
        let results = join_all(writes).await;

        let mut state = self.tags.write().await;
        let mut published = 0;
        let mut retained = 0;
        for (tag, instant, result) in results {
            match result {
                Ok(()) => {
                    state.confirm_pending(tag, instant);
                    published += 1;
                }
                Err(err) => {
                    warn!("[{}] {}; keeping update pending", self.namespace, err);
                    retained += 1;
                }
            }
        }

        debug!(
            "[{}] Published {} tag updates, {} retained",
            self.namespace, published, retained
        );
        (published, retained)
    }

    /// Publishes a single update right away, outside the cycle.
    ///
    /// On success the matching pending entry is dropped; on failure it stays
    /// for the next cycle.
    pub async fn publish_one(&self, tag: &str, instant: u64) {
        match self.keeper.write(tag, instant).await {
            Ok(()) => self.tags.write().await.confirm_pending(tag, instant),
            Err(err) => debug!("[{}] Forced flush failed: {}", self.namespace, err),
        }
    }

    // == Pull ==
    /// Loads what the keeper holds since the watermark, which trails the
    /// clock by the window rather than the newest instant seen.
    async fn pull(&self) -> Option<usize> {
        let since = self.tags.read().await.watermark();
        let now = current_timestamp_ms();

        match self.keeper.load(since).await {
            Ok(remote) => {
                let mut state = self.tags.write().await;
                let advanced = state.merge(&remote);
                state.roll_watermark(now.saturating_sub(self.window_ms));
                drop(state);
                if advanced > 0 {
                    debug!(
                        "[{}] Pulled {} tags, {} advanced",
                        self.namespace,
                        remote.len(),
                        advanced
                    );
                }
                Some(advanced)
            }
            Err(err) => {
                warn!("[{}] {}; skipping pull this cycle", self.namespace, err);
                None
            }
        }
    }
}

/// Spawns the periodic sync loop for `engine`.
///
/// The first cycle runs one full period after spawning. The returned handle
/// is aborted to stop the loop.
pub fn spawn_tag_sync_task(engine: Arc<TagSyncEngine>, interval_ms: u64) -> JoinHandle<()> {
    let period = Duration::from_millis(interval_ms.max(1));

    tokio::spawn(async move {
        info!(
            "[{}] Starting tag sync task with interval of {} ms",
            engine.namespace,
            period.as_millis()
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if engine.try_run_cycle().await.is_none() {
                debug!(
                    "[{}] Previous tag sync still running, skipping tick",
                    engine.namespace
                );
            }
        }
    })
}
