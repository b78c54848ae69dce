use std::collections::HashSet;
use std::time::Duration;

use aidpulse_core::error::{AidPulseError, Result};
use aidpulse_core::{Metric, MetricKind, MetricSet, Thresholds, MAX_MAGNITUDE};
use serde::Deserialize;

use crate::mock;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    pub version: u32,

    #[serde(default)]
    pub simulator: SimulatorSection,

    #[serde(default)]
    pub kinds: KindsSection,

    /// Empty means "mount the built-in mock panels".
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AidPulseError::UnsupportedVersion);
        }

        self.simulator.validate()?;
        self.kinds.validate()?;

        let mut seen = HashSet::new();
        for p in &self.panels {
            if p.id.trim().is_empty() {
                return Err(AidPulseError::BadConfig("panels[].id must not be empty".into()));
            }
            if !seen.insert(p.id.as_str()) {
                return Err(AidPulseError::BadConfig(format!("duplicate panel id: {}", p.id)));
            }
            // Metric construction errors are configuration errors; surface them at load.
            p.build(&self.kinds)?;
        }

        Ok(())
    }

    /// Seed one `MetricSet` per panel, in declaration order.
    pub fn panel_sets(&self) -> Result<Vec<MetricSet>> {
        if self.panels.is_empty() {
            return mock::default_panels(&self.kinds);
        }
        self.panels.iter().map(|p| p.build(&self.kinds)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// One tracing event per update.
    #[default]
    Log,
    /// One JSON line per update on stdout.
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorSection {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Fixed seed for reproducible runs; entropy when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    #[serde(default)]
    pub display: DisplayMode,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            rng_seed: None,
            display: DisplayMode::default(),
        }
    }
}

impl SimulatorSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=600000).contains(&self.tick_interval_ms) {
            return Err(AidPulseError::BadConfig(
                "simulator.tick_interval_ms must be between 100 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn default_tick_interval_ms() -> u64 {
    5000
}

/// Per-kind perturbation magnitude.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindsSection {
    #[serde(default = "default_percentage")]
    pub percentage: KindSpec,

    #[serde(default = "default_count")]
    pub count: KindSpec,
}

impl Default for KindsSection {
    fn default() -> Self {
        Self {
            percentage: default_percentage(),
            count: default_count(),
        }
    }
}

impl KindsSection {
    pub fn validate(&self) -> Result<()> {
        for (name, spec) in [("percentage", &self.percentage), ("count", &self.count)] {
            if !(0.0..=MAX_MAGNITUDE).contains(&spec.magnitude) {
                return Err(AidPulseError::BadConfig(format!(
                    "kinds.{name}.magnitude must be in [0, {MAX_MAGNITUDE:e}]"
                )));
            }
        }
        Ok(())
    }

    pub fn magnitude_for(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Percentage => self.percentage.magnitude,
            MetricKind::Count => self.count.magnitude,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindSpec {
    pub magnitude: f64,
}

fn default_percentage() -> KindSpec {
    KindSpec {
        magnitude: MetricKind::Percentage.default_magnitude(),
    }
}
fn default_count() -> KindSpec {
    KindSpec {
        magnitude: MetricKind::Count.default_magnitude(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    pub id: String,
    pub metrics: Vec<MetricConfig>,
}

impl PanelConfig {
    pub fn build(&self, kinds: &KindsSection) -> Result<MetricSet> {
        if self.metrics.is_empty() {
            return Err(AidPulseError::BadConfig(format!(
                "panel {} must declare at least one metric",
                self.id
            )));
        }
        let metrics = self
            .metrics
            .iter()
            .map(|m| m.build(kinds))
            .collect::<Result<Vec<_>>>()?;
        MetricSet::new(self.id.clone(), metrics)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricConfig {
    pub name: String,
    pub kind: MetricKind,
    pub value: f64,

    /// Kind default when absent.
    #[serde(default)]
    pub min: Option<f64>,
    /// Kind default when absent; counts are open-ended.
    #[serde(default)]
    pub max: Option<f64>,
    /// Overrides `kinds.<kind>.magnitude`.
    #[serde(default)]
    pub magnitude: Option<f64>,
    /// Move in whole steps; counts always do.
    #[serde(default)]
    pub whole: bool,

    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub critical: Option<f64>,
}

impl MetricConfig {
    pub fn build(&self, kinds: &KindsSection) -> Result<Metric> {
        let (dmin, dmax) = self.kind.default_bounds();
        let mut b = Metric::builder(self.name.clone(), self.kind, self.value)
            .bounds(self.min.unwrap_or(dmin), self.max.unwrap_or(dmax))
            .magnitude(self.magnitude.unwrap_or_else(|| kinds.magnitude_for(self.kind)));

        let thresholds = match (self.low, self.critical) {
            (Some(low), Some(critical)) => Some(Thresholds::new(low, critical)),
            (None, Some(critical)) => Some(Thresholds::critical_only(critical)),
            (Some(low), None) => Some(Thresholds::low_only(low)),
            (None, None) => None,
        };
        if let Some(t) = thresholds {
            b = b.thresholds(t);
        }
        if self.whole {
            b = b.whole();
        }
        b.build()
    }
}
