//! Dirty-slice tracking and per-tier debounce workers.
//!
//! Each tier owns a set of dirty slices and a worker task. Marking a slice
//! wakes the worker, which re-arms its deadline to `now + window`. When
//! the deadline passes without another wake, the worker drains the set.

use officesync_model::{Slice, Tier};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// Why a tier was drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The settle window elapsed with no further changes.
    Settled,
    /// `flush()` was called.
    Manual,
}

/// Pending slices of one tier.
#[derive(Debug)]
pub struct TierQueue {
    tier: Tier,
    dirty: Mutex<BTreeSet<Slice>>,
    wake: mpsc::Sender<()>,
}

impl TierQueue {
    /// Creates a queue and the receiving end of its wake channel.
    pub fn new(tier: Tier) -> (Self, mpsc::Receiver<()>) {
        // One queued wake is enough: it re-arms the deadline after every
        // mark that preceded it.
        let (wake, rx) = mpsc::channel(1);
        let queue = Self {
            tier,
            dirty: Mutex::new(BTreeSet::new()),
            wake,
        };
        (queue, rx)
    }

    /// Adds a slice and wakes the worker. Returns true if the slice was
    /// not already pending.
    pub fn mark(&self, slice: Slice) -> bool {
        let inserted = self.dirty.lock().insert(slice);
        self.notify();
        inserted
    }

    /// Wakes the worker so it re-evaluates its deadline.
    pub fn notify(&self) {
        match self.wake.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => {
                trace!(tier = %self.tier, "worker gone; wake dropped");
            }
        }
    }

    /// Atomically takes every pending slice.
    pub fn take(&self) -> BTreeSet<Slice> {
        std::mem::take(&mut *self.dirty.lock())
    }

    /// Forgets every pending slice.
    pub fn clear(&self) {
        self.dirty.lock().clear();
    }

    /// Pending slices in order.
    pub fn pending(&self) -> Vec<Slice> {
        self.dirty.lock().iter().copied().collect()
    }

    /// Returns true when any slice is pending.
    pub fn has_pending(&self) -> bool {
        !self.dirty.lock().is_empty()
    }
}

/// One upsert dispatched by a drain.
#[derive(Debug)]
pub struct DispatchedWrite {
    /// Slice written.
    pub slice: Slice,
    /// Resolves to true when the backend accepted the rows.
    pub handle: JoinHandle<bool>,
}

/// What a single drain dispatched.
#[derive(Debug)]
pub struct DrainReport {
    /// Drained tier.
    pub tier: Tier,
    /// Trigger.
    pub reason: FlushReason,
    /// Upserts dispatched, one per slice.
    pub writes: Vec<DispatchedWrite>,
}

impl DrainReport {
    /// A report for a drain that found nothing to write.
    pub fn empty(tier: Tier, reason: FlushReason) -> Self {
        Self {
            tier,
            reason,
            writes: Vec::new(),
        }
    }

    /// Slices that were dispatched.
    pub fn slices(&self) -> Vec<Slice> {
        self.writes.iter().map(|w| w.slice).collect()
    }

    /// Returns true when nothing was dispatched.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Drains the pending slices of a tier.
pub trait Drainer: Send + Sync + 'static {
    /// Takes the tier's dirty set and dispatches its writes.
    fn drain(&self, tier: Tier, reason: FlushReason) -> DrainReport;

    /// Returns true when the tier has pending slices.
    fn has_pending(&self, tier: Tier) -> bool;
}

/// Runs the debounce loop of one tier until its wake channel closes or
/// the task is aborted.
pub async fn run_tier<D: Drainer>(
    tier: Tier,
    window: Duration,
    drainer: Arc<D>,
    mut wake: mpsc::Receiver<()>,
) {
    let mut deadline: Option<Instant> = None;
    debug!(tier = %tier, window_ms = window.as_millis() as u64, "tier worker started");

    loop {
        let sleep = sleep_until(deadline.unwrap_or_else(Instant::now));

        tokio::select! {
            biased;

            msg = wake.recv() => match msg {
                Some(()) => {
                    deadline = drainer
                        .has_pending(tier)
                        .then(|| Instant::now() + window);
                }
                None => break,
            },

            _ = sleep, if deadline.is_some() => {
                deadline = None;
                let report = drainer.drain(tier, FlushReason::Settled);
                if !report.is_empty() {
                    debug!(tier = %tier, slices = ?report.slices(), "tier settled");
                }
            }
        }
    }

    debug!(tier = %tier, "tier worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingDrainer {
        queue: TierQueue,
        drains: Mutex<Vec<(Instant, Vec<Slice>)>>,
    }

    impl Drainer for RecordingDrainer {
        fn drain(&self, tier: Tier, reason: FlushReason) -> DrainReport {
            let taken: Vec<Slice> = self.queue.take().into_iter().collect();
            self.drains.lock().push((Instant::now(), taken));
            DrainReport::empty(tier, reason)
        }

        fn has_pending(&self, _tier: Tier) -> bool {
            self.queue.has_pending()
        }
    }

    fn spawn_worker(window_ms: u64) -> (Arc<RecordingDrainer>, JoinHandle<()>) {
        let (queue, rx) = TierQueue::new(Tier::Normal);
        let drainer = Arc::new(RecordingDrainer {
            queue,
            drains: Mutex::new(Vec::new()),
        });
        let handle = tokio::spawn(run_tier(
            Tier::Normal,
            Duration::from_millis(window_ms),
            Arc::clone(&drainer),
            rx,
        ));
        (drainer, handle)
    }

    #[test]
    fn queue_membership_is_idempotent() {
        let (queue, _rx) = TierQueue::new(Tier::Position);
        assert!(queue.mark(Slice::Avatars));
        assert!(!queue.mark(Slice::Avatars));
        assert!(queue.mark(Slice::Rooms));
        assert_eq!(queue.pending(), vec![Slice::Rooms, Slice::Avatars]);

        let taken = queue.take();
        assert_eq!(taken.len(), 2);
        assert!(!queue.has_pending());
    }

    #[test]
    fn marking_with_a_full_or_closed_channel_does_not_block() {
        let (queue, rx) = TierQueue::new(Tier::Normal);
        for _ in 0..10 {
            queue.mark(Slice::Tasks);
        }
        drop(rx);
        queue.mark(Slice::Settings);
        assert_eq!(queue.pending(), vec![Slice::Tasks, Slice::Settings]);

        queue.clear();
        assert!(!queue.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_rearms_on_every_mark() {
        let (drainer, _worker) = spawn_worker(500);
        let start = Instant::now();

        for _ in 0..5 {
            drainer.queue.mark(Slice::Tasks);
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert!(drainer.drains.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        let drains = drainer.drains.lock();
        assert_eq!(drains.len(), 1);
        assert_eq!(drains[0].1, vec![Slice::Tasks]);
        // Last mark at 1200ms, settled 500ms later.
        let elapsed = drains[0].0 - start;
        assert!(elapsed >= Duration::from_millis(1700), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1710), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn external_drain_disarms_deadline() {
        let (drainer, _worker) = spawn_worker(500);

        drainer.queue.mark(Slice::Projects);
        tokio::time::sleep(Duration::from_millis(100)).await;

        drainer.queue.take();
        drainer.queue.notify();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(drainer.drains.lock().is_empty());
    }
}
