//! Bounded metrics and the perturb-and-clamp tick.
//!
//! Invariants (hold for every `Metric` that exists):
//! - `min` is finite, `max` is `>= min` and may be `+inf`.
//! - `min <= value <= max` and `value` is finite.
//! - `magnitude` is non-negative and at most [`MAX_MAGNITUDE`], so the full
//!   draw width `2 * magnitude` is finite.
//! - Whole-step metrics (every `Count`, and any metric built with
//!   [`MetricBuilder::whole`]) have whole `value` and `min`, and a whole or
//!   infinite `max`.
//!
//! Construction is the only fallible step. Ticking is total: a draw that
//! would leave the range is pinned to the nearest bound, and a non-finite
//! draw leaves the value untouched.

use serde::{Deserialize, Serialize, Serializer};

use crate::band::{Band, Thresholds};
use crate::delta::DeltaSource;
use crate::error::{AidPulseError, Result};

/// Largest accepted perturbation half-width.
pub const MAX_MAGNITUDE: f64 = f64::MAX / 2.0;

fn is_whole(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0
}

/// What a metric measures; supplies default bounds and perturbation size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Coverage-style value in `[0, 100]`, continuous.
    Percentage,
    /// Stock-style value in `[0, +inf)`, whole numbers only.
    Count,
}

impl MetricKind {
    pub fn default_bounds(self) -> (f64, f64) {
        match self {
            MetricKind::Percentage => (0.0, 100.0),
            MetricKind::Count => (0.0, f64::INFINITY),
        }
    }

    pub fn default_magnitude(self) -> f64 {
        match self {
            MetricKind::Percentage => 5.0,
            MetricKind::Count => 1000.0,
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(self, MetricKind::Count)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Percentage => "percentage",
            MetricKind::Count => "count",
        }
    }
}

/// Where a single update landed relative to the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamp {
    Within,
    Floor,
    Ceiling,
}

/// A named, bounded numeric display value.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    name: String,
    kind: MetricKind,
    value: f64,
    min: f64,
    max: f64,
    magnitude: f64,
    whole: bool,
    thresholds: Option<Thresholds>,
}

impl Metric {
    /// Start a percentage metric (`[0, 100]`, ±5 by default).
    pub fn percentage(name: impl Into<String>, value: f64) -> MetricBuilder {
        MetricBuilder::new(name.into(), MetricKind::Percentage, value)
    }

    /// Start a count metric (`[0, +inf)`, ±1000 by default).
    pub fn count(name: impl Into<String>, value: f64) -> MetricBuilder {
        MetricBuilder::new(name.into(), MetricKind::Count, value)
    }

    pub fn builder(name: impl Into<String>, kind: MetricKind, value: f64) -> MetricBuilder {
        MetricBuilder::new(name.into(), kind, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> MetricKind {
        self.kind
    }
    pub fn value(&self) -> f64 {
        self.value
    }
    pub fn min(&self) -> f64 {
        self.min
    }
    pub fn max(&self) -> f64 {
        self.max
    }
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }
    pub fn thresholds(&self) -> Option<&Thresholds> {
        self.thresholds.as_ref()
    }

    /// Moves in whole steps only.
    pub fn is_integral(&self) -> bool {
        self.whole
    }

    pub fn band(&self) -> Band {
        Band::of(self.value, self.thresholds.as_ref())
    }

    /// Move the value by `delta` and clamp it into `[min, max]`.
    ///
    /// Whole-step metrics round to the nearest whole number before clamping;
    /// their bounds are whole, so the result stays whole.
    pub fn apply_delta(&mut self, delta: f64) -> Clamp {
        let mut next = self.value + delta;
        if !next.is_finite() {
            return Clamp::Within;
        }
        if self.whole {
            next = next.round();
        }

        if next < self.min {
            self.value = self.min;
            Clamp::Floor
        } else if next > self.max {
            self.value = self.max;
            Clamp::Ceiling
        } else {
            self.value = next;
            Clamp::Within
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            name: &'a str,
            kind: MetricKind,
            value: f64,
            min: f64,
            max: Option<f64>,
            band: Band,
        }

        View {
            name: &self.name,
            kind: self.kind,
            value: self.value,
            min: self.min,
            max: self.max.is_finite().then_some(self.max),
            band: self.band(),
        }
        .serialize(serializer)
    }
}

/// Validating builder for [`Metric`].
#[derive(Debug, Clone)]
pub struct MetricBuilder {
    name: String,
    kind: MetricKind,
    value: f64,
    min: f64,
    max: f64,
    magnitude: f64,
    whole: bool,
    thresholds: Option<Thresholds>,
}

impl MetricBuilder {
    fn new(name: String, kind: MetricKind, value: f64) -> Self {
        let (min, max) = kind.default_bounds();
        Self {
            name,
            kind,
            value,
            min,
            max,
            magnitude: kind.default_magnitude(),
            whole: kind.is_integral(),
            thresholds: None,
        }
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = min;
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    /// Half-width of the symmetric perturbation range.
    pub fn magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Restrict a continuous kind to whole steps. Counts are always whole.
    pub fn whole(mut self) -> Self {
        self.whole = true;
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn build(self) -> Result<Metric> {
        if self.name.trim().is_empty() {
            return Err(AidPulseError::invalid_metric(&self.name, "name must not be empty"));
        }
        if !self.min.is_finite() || self.max.is_nan() || self.min > self.max {
            return Err(AidPulseError::InvalidRange {
                metric: self.name,
                min: self.min,
                max: self.max,
            });
        }
        let whole_max = is_whole(self.max) || self.max == f64::INFINITY;
        if self.whole && (!is_whole(self.min) || !whole_max) {
            return Err(AidPulseError::InvalidRange {
                metric: self.name,
                min: self.min,
                max: self.max,
            });
        }
        if !self.value.is_finite() || self.value < self.min || self.value > self.max {
            return Err(AidPulseError::invalid_metric(
                &self.name,
                format!("seed value {} outside [{}, {}]", self.value, self.min, self.max),
            ));
        }
        if self.whole && !is_whole(self.value) {
            return Err(AidPulseError::invalid_metric(
                &self.name,
                format!("seed value {} must be a whole number", self.value),
            ));
        }
        if !(0.0..=MAX_MAGNITUDE).contains(&self.magnitude) {
            return Err(AidPulseError::invalid_metric(
                &self.name,
                format!("magnitude must be in [0, {MAX_MAGNITUDE:e}], got {}", self.magnitude),
            ));
        }
        if let Some(t) = &self.thresholds {
            if !t.is_ordered() {
                return Err(AidPulseError::invalid_metric(
                    &self.name,
                    "thresholds must be finite with critical <= low",
                ));
            }
        }

        Ok(Metric {
            name: self.name,
            kind: self.kind,
            value: self.value,
            min: self.min,
            max: self.max,
            magnitude: self.magnitude,
            whole: self.whole,
            thresholds: self.thresholds,
        })
    }
}

/// Counts from one pass over a set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub updated: usize,
    pub floor: usize,
    pub ceiling: usize,
}

/// Ordered group of metrics belonging to one display panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSet {
    id: String,
    metrics: Vec<Metric>,
}

impl MetricSet {
    /// Build a set; metric names must be unique.
    pub fn new(id: impl Into<String>, metrics: Vec<Metric>) -> Result<Self> {
        let mut set = Self {
            id: id.into(),
            metrics: Vec::with_capacity(metrics.len()),
        };
        for m in metrics {
            set.push(m)?;
        }
        Ok(set)
    }

    pub fn push(&mut self, metric: Metric) -> Result<()> {
        if self.get(metric.name()).is_some() {
            return Err(AidPulseError::DuplicateMetric {
                set: self.id.clone(),
                metric: metric.name,
            });
        }
        self.metrics.push(metric);
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Metric> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// One update cycle, returning the new snapshot and leaving `self` as is.
    pub fn tick<D: DeltaSource + ?Sized>(&self, source: &mut D) -> MetricSet {
        let mut next = self.clone();
        next.tick_in_place(source);
        next
    }

    /// One update cycle applied to this set.
    ///
    /// Each metric draws its own delta; there is no coupling between fields.
    pub fn tick_in_place<D: DeltaSource + ?Sized>(&mut self, source: &mut D) -> TickReport {
        let mut report = TickReport::default();
        for m in &mut self.metrics {
            let delta = source.draw(m);
            match m.apply_delta(delta) {
                Clamp::Within => {}
                Clamp::Floor => {
                    tracing::trace!(set = %self.id, metric = %m.name, delta, "pinned to floor");
                    report.floor += 1;
                }
                Clamp::Ceiling => {
                    tracing::trace!(set = %self.id, metric = %m.name, delta, "pinned to ceiling");
                    report.ceiling += 1;
                }
            }
            report.updated += 1;
        }
        report
    }

    pub fn total(&self) -> f64 {
        self.metrics.iter().map(Metric::value).sum()
    }

    /// Arithmetic mean of all values, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.metrics.is_empty() {
            return None;
        }
        Some(self.total() / self.metrics.len() as f64)
    }

    /// Metrics currently in the critical band.
    pub fn alerts(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter().filter(|m| m.band() == Band::Critical)
    }
}

impl<'a> IntoIterator for &'a MetricSet {
    type Item = &'a Metric;
    type IntoIter = std::slice::Iter<'a, Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.iter()
    }
}
