//! One periodic task per mounted panel.
//!
//! Lifecycle:
//! - On spawn the seed snapshot is published as `seq = 0`.
//! - Every `interval` the task ticks its `MetricSet` and publishes `seq = n`.
//!   The first tick fires one full interval after spawn.
//! - `PanelHandle::cancel` (or dropping the handle) closes the delivery gate
//!   and signals the task to exit.
//!
//! Delivery happens while holding the gate lock, and cancel closes the gate
//! under the same lock. Once `cancel` returns no further update reaches the
//! sink, whatever point of the interval the task is at.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use aidpulse_core::{DeltaSource, MetricSet};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::display::{DisplaySink, PanelUpdate};
use crate::obs::SimMetrics;

/// Everything a panel task needs; consumed by [`PanelTask::spawn`].
pub struct PanelTask {
    pub set: MetricSet,
    pub interval: Duration,
    pub source: Box<dyn DeltaSource + Send>,
    pub sink: Arc<dyn DisplaySink>,
    pub metrics: Arc<SimMetrics>,
}

/// Keeps `aidpulse_panels_active` honest even if the task is aborted before
/// it is first polled.
struct ActiveGuard(Arc<SimMetrics>);

impl ActiveGuard {
    fn new(metrics: Arc<SimMetrics>) -> Self {
        metrics.panels_active.inc(&[]);
        Self(metrics)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.panels_active.dec(&[]);
    }
}

impl PanelTask {
    /// Spawn onto the current tokio runtime.
    pub fn spawn(self) -> PanelHandle {
        let panel: Arc<str> = Arc::from(self.set.id());
        let gate = Arc::new(Mutex::new(true));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (latest_tx, latest_rx) = watch::channel(PanelUpdate {
            seq: 0,
            set: self.set.clone(),
        });

        let guard = ActiveGuard::new(Arc::clone(&self.metrics));
        let join = tokio::spawn(run(self, Arc::clone(&gate), shutdown_rx, latest_tx, guard));

        PanelHandle {
            panel,
            gate,
            shutdown: Some(shutdown_tx),
            join: Some(join),
            latest: latest_rx,
        }
    }
}

/// Publish under the gate. Returns `false` if the panel was cancelled.
fn deliver(
    gate: &Mutex<bool>,
    sink: &dyn DisplaySink,
    latest: &watch::Sender<PanelUpdate>,
    update: PanelUpdate,
) -> bool {
    let open = gate.lock().unwrap_or_else(PoisonError::into_inner);
    if !*open {
        return false;
    }
    sink.on_update(&update);
    latest.send_replace(update);
    true
}

async fn run(
    task: PanelTask,
    gate: Arc<Mutex<bool>>,
    mut shutdown: oneshot::Receiver<()>,
    latest: watch::Sender<PanelUpdate>,
    _guard: ActiveGuard,
) {
    let PanelTask {
        mut set,
        interval,
        mut source,
        sink,
        metrics,
    } = task;
    let panel = set.id().to_string();
    let labels = [("panel", panel.as_str())];

    let seed = PanelUpdate {
        seq: 0,
        set: set.clone(),
    };
    if !deliver(&gate, sink.as_ref(), &latest, seed) {
        return;
    }
    metrics.updates_delivered.inc(&labels);

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut seq = 0u64;
    loop {
        tokio::select! {
            biased;

            // Fires on cancel, and on handle drop (sender dropped).
            _ = &mut shutdown => break,

            _ = ticker.tick() => {
                let started = std::time::Instant::now();
                let report = set.tick_in_place(&mut *source);
                metrics.tick_duration.observe(&labels, started.elapsed());

                seq += 1;
                metrics.ticks.inc(&labels);
                metrics.clamps.add(&[("panel", panel.as_str()), ("edge", "floor")], report.floor as u64);
                metrics.clamps.add(&[("panel", panel.as_str()), ("edge", "ceiling")], report.ceiling as u64);

                let update = PanelUpdate { seq, set: set.clone() };
                if !deliver(&gate, sink.as_ref(), &latest, update) {
                    metrics.updates_suppressed.inc(&labels);
                    break;
                }
                metrics.updates_delivered.inc(&labels);
            }
        }
    }

    tracing::debug!(panel = %panel, ticks = seq, "panel task stopped");
}

/// Owning handle for a running panel task. Dropping it cancels the task.
pub struct PanelHandle {
    panel: Arc<str>,
    gate: Arc<Mutex<bool>>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
    latest: watch::Receiver<PanelUpdate>,
}

impl PanelHandle {
    pub fn panel(&self) -> &str {
        &self.panel
    }

    /// Last published snapshot (the seed until the first tick lands).
    pub fn snapshot(&self) -> PanelUpdate {
        self.latest.borrow().clone()
    }

    /// Pull-style access for display layers that poll instead of being pushed to.
    pub fn subscribe(&self) -> watch::Receiver<PanelUpdate> {
        self.latest.clone()
    }

    pub fn is_active(&self) -> bool {
        let open = *self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        open && self.join.as_ref().is_some_and(|j| !j.is_finished())
    }

    /// Stop delivery now. Idempotent.
    ///
    /// Must not be called from inside `DisplaySink::on_update` for the same
    /// panel: delivery holds the gate lock.
    pub fn cancel(&mut self) {
        {
            let mut open = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            *open = false;
        }
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Cancel and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel();
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                if e.is_panic() {
                    tracing::error!(panel = %self.panel, "panel task panicked");
                }
            }
        }
    }
}

impl Drop for PanelHandle {
    fn drop(&mut self) {
        self.cancel();
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}
