//! Sync engine lifecycle.
//!
//! The engine subscribes to a [`StateSource`], marks the slices whose
//! store keys changed, and runs one debounce worker per tier. When a tier
//! settles, the latest state is read once and every dirty slice is
//! written with one upsert.
//!
//! # Usage
//!
//! ```rust,ignore
//! let store = Arc::new(Store::default());
//! let engine = SyncEngine::start(SyncConfig::new(), backend, Arc::clone(&store));
//!
//! store.update(|s| s.set_theme(Theme::Light));
//!
//! // Before the process goes away:
//! engine.flush().wait().await;
//! engine.stop();
//! ```

use crate::backend::Backend;
use crate::config::SyncConfig;
use crate::store::{StateSource, Subscription};
use crate::tracker::{run_tier, DispatchedWrite, DrainReport, Drainer, FlushReason, TierQueue};
use officesync_model::{OfficeState, Row, Slice, Tier};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Sync statistics.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Drains that dispatched at least one write.
    pub drains: u64,
    /// Upserts dispatched.
    pub upserts_issued: u64,
    /// Upserts the backend rejected or never answered.
    pub upserts_failed: u64,
    /// Last error message.
    pub last_error: Option<String>,
    /// Last time `flush()` was called.
    pub last_flush: Option<Instant>,
}

/// Outcome of the writes a flush dispatched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Slices the backend accepted.
    pub flushed: Vec<Slice>,
    /// Slices whose write failed.
    pub failed: Vec<Slice>,
}

impl FlushReport {
    /// Returns true when every dispatched write succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes dispatched by [`SyncEngine::flush`].
///
/// The writes are already running when this is returned. Awaiting
/// [`wait`](Self::wait) is optional; dropping the handle does not cancel
/// anything.
#[derive(Debug, Default)]
pub struct FlushHandle {
    reports: Vec<DrainReport>,
}

impl FlushHandle {
    /// Slices whose writes were dispatched.
    pub fn slices(&self) -> Vec<Slice> {
        self.reports.iter().flat_map(DrainReport::slices).collect()
    }

    /// Returns true when nothing was pending.
    pub fn is_empty(&self) -> bool {
        self.reports.iter().all(DrainReport::is_empty)
    }

    /// Waits for every dispatched write to finish.
    pub async fn wait(self) -> FlushReport {
        let mut report = FlushReport::default();
        let writes = self.reports.into_iter().flat_map(|r| r.writes);
        for DispatchedWrite { slice, handle } in writes {
            match handle.await {
                Ok(true) => report.flushed.push(slice),
                Ok(false) | Err(_) => report.failed.push(slice),
            }
        }
        report
    }
}

struct EngineCore<B: Backend, S: StateSource> {
    backend: Arc<B>,
    source: Arc<S>,
    runtime: Handle,
    position: TierQueue,
    normal: TierQueue,
    stats: Arc<RwLock<SyncStats>>,
    stopped: AtomicBool,
}

impl<B: Backend, S: StateSource> EngineCore<B, S> {
    fn queue(&self, tier: Tier) -> &TierQueue {
        match tier {
            Tier::Position => &self.position,
            Tier::Normal => &self.normal,
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn on_change(&self, next: &OfficeState, prev: &OfficeState) {
        if self.is_stopped() {
            return;
        }

        let mut dirty = BTreeSet::new();
        for key in next.changed_keys(prev) {
            match key.slice() {
                Some(slice) => {
                    dirty.insert(slice);
                }
                None => trace!(key = key.name(), "local-only key changed"),
            }
        }

        for slice in dirty {
            if self.queue(slice.tier()).mark(slice) {
                trace!(slice = %slice, tier = %slice.tier(), "slice marked dirty");
            }
        }
    }

    fn dispatch(&self, slice: Slice, rows: Vec<Row>) -> JoinHandle<bool> {
        self.stats.write().upserts_issued += 1;

        let backend = Arc::clone(&self.backend);
        let stats = Arc::clone(&self.stats);
        let count = rows.len();

        self.runtime.spawn(async move {
            match backend.upsert(slice.table(), rows).await {
                Ok(()) => {
                    debug!(slice = %slice, rows = count, "slice written");
                    true
                }
                Err(e) => {
                    warn!(
                        slice = %slice,
                        error = %e,
                        transient = e.is_transient(),
                        "write failed; change dropped"
                    );
                    let mut stats = stats.write();
                    stats.upserts_failed += 1;
                    stats.last_error = Some(e.to_string());
                    false
                }
            }
        })
    }
}

impl<B: Backend, S: StateSource> Drainer for EngineCore<B, S> {
    fn drain(&self, tier: Tier, reason: FlushReason) -> DrainReport {
        let mut report = DrainReport::empty(tier, reason);

        // Take before checking the flag: a drain racing `stop()` must not
        // dispatch after it returns.
        let dirty = self.queue(tier).take();
        if dirty.is_empty() || self.is_stopped() {
            return report;
        }

        let state = self.source.get_state();
        for slice in dirty {
            let rows = state.encode_slice(slice);
            if rows.is_empty() {
                debug!(slice = %slice, "slice is empty; nothing to write");
                continue;
            }
            let handle = self.dispatch(slice, rows);
            report.writes.push(DispatchedWrite { slice, handle });
        }

        if !report.is_empty() {
            self.stats.write().drains += 1;
        }
        report
    }

    fn has_pending(&self, tier: Tier) -> bool {
        self.queue(tier).has_pending()
    }
}

/// Keeps a backend in step with a store.
///
/// An engine started with a disabled configuration, or outside a tokio
/// runtime, is inert: it never subscribes and never writes.
pub struct SyncEngine<B: Backend, S: StateSource> {
    config: SyncConfig,
    core: Option<Arc<EngineCore<B, S>>>,
    subscription: Mutex<Option<Subscription>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<B: Backend, S: StateSource> SyncEngine<B, S> {
    /// Subscribes to `source` and starts the tier workers.
    pub fn start(config: SyncConfig, backend: Arc<B>, source: Arc<S>) -> Self {
        if !config.enabled {
            debug!("sync disabled; running on local state only");
            return Self::inert(config);
        }
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "no async runtime; sync disabled");
                return Self::inert(config);
            }
        };

        let (position, position_rx) = TierQueue::new(Tier::Position);
        let (normal, normal_rx) = TierQueue::new(Tier::Normal);

        let core = Arc::new(EngineCore {
            backend,
            source: Arc::clone(&source),
            runtime: runtime.clone(),
            position,
            normal,
            stats: Arc::new(RwLock::new(SyncStats::default())),
            stopped: AtomicBool::new(false),
        });

        let workers = vec![
            runtime.spawn(run_tier(
                Tier::Position,
                config.settle_window(Tier::Position),
                Arc::clone(&core),
                position_rx,
            )),
            runtime.spawn(run_tier(
                Tier::Normal,
                config.settle_window(Tier::Normal),
                Arc::clone(&core),
                normal_rx,
            )),
        ];

        let weak: Weak<EngineCore<B, S>> = Arc::downgrade(&core);
        let subscription = source.subscribe(Arc::new(move |next, prev| {
            if let Some(core) = weak.upgrade() {
                core.on_change(next, prev);
            }
        }));

        info!(
            position_ms = config.position_window.as_millis() as u64,
            normal_ms = config.normal_window.as_millis() as u64,
            "sync engine started"
        );

        Self {
            config,
            core: Some(core),
            subscription: Mutex::new(Some(subscription)),
            workers: Mutex::new(workers),
        }
    }

    fn inert(config: SyncConfig) -> Self {
        Self {
            config,
            core: None,
            subscription: Mutex::new(None),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns true while the engine is subscribed and writing.
    pub fn is_running(&self) -> bool {
        self.core.as_ref().is_some_and(|core| !core.is_stopped())
    }

    /// Drains both tiers now.
    ///
    /// Every pending write has been dispatched when this returns, so it is
    /// safe to call from a synchronous shutdown path and drop the handle.
    /// Armed deadlines are disarmed; the tiers are idle afterwards.
    pub fn flush(&self) -> FlushHandle {
        let Some(core) = self.core.as_ref().filter(|core| !core.is_stopped()) else {
            return FlushHandle::default();
        };

        let reports: Vec<DrainReport> = Tier::ALL
            .into_iter()
            .map(|tier| core.drain(tier, FlushReason::Manual))
            .collect();
        for tier in Tier::ALL {
            core.queue(tier).notify();
        }
        core.stats.write().last_flush = Some(Instant::now());

        let handle = FlushHandle { reports };
        debug!(slices = ?handle.slices(), "flushed");
        handle
    }

    /// Unsubscribes, stops both workers and forgets pending slices.
    ///
    /// Writes already dispatched keep running. Calling this twice is
    /// harmless.
    pub fn stop(&self) {
        let Some(core) = &self.core else {
            return;
        };
        if core.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
        }
        for worker in self.workers.lock().drain(..) {
            worker.abort();
        }
        for tier in Tier::ALL {
            core.queue(tier).clear();
        }
        info!("sync engine stopped");
    }

    /// Slices waiting in a tier.
    pub fn pending(&self, tier: Tier) -> Vec<Slice> {
        self.core
            .as_ref()
            .map(|core| core.queue(tier).pending())
            .unwrap_or_default()
    }

    /// Returns a snapshot of the statistics.
    pub fn stats(&self) -> SyncStats {
        self.core
            .as_ref()
            .map(|core| core.stats.read().clone())
            .unwrap_or_default()
    }
}

impl<B: Backend, S: StateSource> Drop for SyncEngine<B, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
