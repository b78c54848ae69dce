use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aidpulse_core::error::{AidPulseError, Result};
use aidpulse_core::{DeltaSource, MetricSet, RandomDelta};

use super::panel_registry::PanelRegistry;
use super::panel_task::PanelTask;
use crate::display::{DisplaySink, PanelUpdate};
use crate::obs::SimMetrics;

/// Mounts and tears down panels; each mounted panel ticks on its own timer.
pub struct Simulator {
    panels: PanelRegistry,
    metrics: Arc<SimMetrics>,
    sink: Arc<dyn DisplaySink>,
    interval: Duration,
    rng_seed: Option<u64>,
    sources_issued: AtomicU64,
}

impl Simulator {
    pub fn new(
        interval: Duration,
        sink: Arc<dyn DisplaySink>,
        metrics: Arc<SimMetrics>,
        rng_seed: Option<u64>,
    ) -> Self {
        Self {
            panels: PanelRegistry::new(),
            metrics,
            sink,
            interval,
            rng_seed,
            sources_issued: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn metrics(&self) -> &SimMetrics {
        &self.metrics
    }

    /// Seeded runs give panel `n` (in mount order) the stream `seed + n`.
    /// Called only after the mount has claimed its id.
    fn next_source(&self) -> Box<dyn DeltaSource + Send> {
        let n = self.sources_issued.fetch_add(1, Ordering::Relaxed);
        match self.rng_seed {
            Some(base) => Box::new(RandomDelta::seeded(base.wrapping_add(n))),
            None => Box::new(RandomDelta::from_entropy()),
        }
    }

    /// Mount a panel driven by uniform random deltas.
    pub fn mount(&self, set: MetricSet) -> Result<()> {
        self.mount_inner(set, || self.next_source())
    }

    /// Mount a panel with an explicit delta source.
    pub fn mount_with(&self, set: MetricSet, source: Box<dyn DeltaSource + Send>) -> Result<()> {
        self.mount_inner(set, move || source)
    }

    fn mount_inner<F>(&self, set: MetricSet, source: F) -> Result<()>
    where
        F: FnOnce() -> Box<dyn DeltaSource + Send>,
    {
        let panel = set.id().to_string();
        let metric_count = set.len();
        let interval = self.interval;
        let sink = Arc::clone(&self.sink);
        let metrics = Arc::clone(&self.metrics);

        let spawn = move || {
            PanelTask {
                set,
                interval,
                source: source(),
                sink,
                metrics,
            }
            .spawn()
        };

        match self.panels.insert_with(&panel, spawn) {
            Ok(mount_seq) => {
                self.metrics.mounts.inc(&[("outcome", "ok")]);
                tracing::info!(
                    panel = %panel,
                    metrics = metric_count,
                    interval_ms = self.interval.as_millis() as u64,
                    mount_seq,
                    "panel mounted"
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.mounts.inc(&[("outcome", "conflict")]);
                tracing::warn!(panel = %panel, "panel already mounted");
                Err(e)
            }
        }
    }

    /// Cancel a panel. No update is delivered for it after this returns.
    pub fn unmount(&self, panel: &str) -> Result<()> {
        let mut handle = self
            .panels
            .remove(panel)
            .ok_or_else(|| AidPulseError::UnknownPanel(panel.to_string()))?;
        handle.cancel();
        tracing::info!(panel = %panel, "panel unmounted");
        Ok(())
    }

    /// Like `unmount`, and also waits for the task to finish.
    pub async fn unmount_and_wait(&self, panel: &str) -> Result<()> {
        let handle = self
            .panels
            .remove(panel)
            .ok_or_else(|| AidPulseError::UnknownPanel(panel.to_string()))?;
        handle.stop().await;
        tracing::info!(panel = %panel, "panel unmounted");
        Ok(())
    }

    pub fn snapshot(&self, panel: &str) -> Option<PanelUpdate> {
        self.panels.snapshot(panel)
    }

    pub fn panel_ids(&self) -> Vec<String> {
        self.panels.panel_ids()
    }

    pub fn active_panels(&self) -> usize {
        self.panels.len()
    }

    /// Cancel every panel and wait for all tasks to exit.
    pub async fn shutdown(&self) {
        let handles = self.panels.drain();
        let n = handles.len();
        for h in handles {
            h.stop().await;
        }
        tracing::info!(panels = n, "simulator stopped");
    }
}
