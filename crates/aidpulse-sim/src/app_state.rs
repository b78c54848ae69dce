//! Shared application state for the simulator binary.
//!
//! Builds the display sink and the panel seeds from config up front so that
//! every configuration error surfaces before the first timer starts.

use std::sync::Arc;

use aidpulse_core::error::Result;
use aidpulse_core::MetricSet;

use crate::config::{DisplayMode, SimConfig};
use crate::display::{DisplaySink, JsonDisplay, LogDisplay};
use crate::obs::SimMetrics;
use crate::runtime::Simulator;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    simulator: Arc<Simulator>,
    metrics: Arc<SimMetrics>,
}

struct AppStateInner {
    cfg: SimConfig,
    seeds: Vec<MetricSet>,
}

impl AppState {
    /// Build state with the sink selected by `simulator.display`.
    pub fn new(cfg: SimConfig) -> Result<Self> {
        let sink: Arc<dyn DisplaySink> = match cfg.simulator.display {
            DisplayMode::Log => Arc::new(LogDisplay::new()),
            DisplayMode::Json => Arc::new(JsonDisplay::stdout()),
        };
        Self::with_sink(cfg, sink)
    }

    pub fn with_sink(cfg: SimConfig, sink: Arc<dyn DisplaySink>) -> Result<Self> {
        let seeds = cfg.panel_sets()?;
        if cfg.panels.is_empty() {
            tracing::info!(panels = seeds.len(), "no panels configured, using built-in mock panels");
        }

        let metrics = Arc::new(SimMetrics::default());
        let simulator = Arc::new(Simulator::new(
            cfg.simulator.tick_interval(),
            sink,
            Arc::clone(&metrics),
            cfg.simulator.rng_seed,
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, seeds }),
            simulator,
            metrics,
        })
    }

    pub fn cfg(&self) -> &SimConfig {
        &self.inner.cfg
    }

    pub fn seeds(&self) -> &[MetricSet] {
        &self.inner.seeds
    }

    /// Mount every seeded panel.
    pub fn start(&self) -> Result<()> {
        for set in &self.inner.seeds {
            self.simulator.mount(set.clone())?;
        }
        Ok(())
    }

    pub fn simulator(&self) -> Arc<Simulator> {
        Arc::clone(&self.simulator)
    }

    pub fn metrics(&self) -> Arc<SimMetrics> {
        Arc::clone(&self.metrics)
    }
}
