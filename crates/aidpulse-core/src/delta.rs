//! Perturbation sources for [`MetricSet::tick`](crate::MetricSet::tick).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::metric::Metric;

/// Supplies the delta applied to one metric during a tick.
pub trait DeltaSource {
    fn draw(&mut self, metric: &Metric) -> f64;
}

impl<D: DeltaSource + ?Sized> DeltaSource for &mut D {
    fn draw(&mut self, metric: &Metric) -> f64 {
        (**self).draw(metric)
    }
}

impl<D: DeltaSource + ?Sized> DeltaSource for Box<D> {
    fn draw(&mut self, metric: &Metric) -> f64 {
        (**self).draw(metric)
    }
}

/// Uniform draw from `[-magnitude, +magnitude]`.
///
/// Whole-step metrics draw a whole number from the same closed range.
#[derive(Debug, Clone)]
pub struct RandomDelta<R> {
    rng: R,
}

impl<R: Rng> RandomDelta<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomDelta<SmallRng> {
    /// Reproducible stream for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

impl<R: Rng> DeltaSource for RandomDelta<R> {
    fn draw(&mut self, metric: &Metric) -> f64 {
        let m = metric.magnitude();
        if m <= 0.0 {
            return 0.0;
        }
        if metric.is_integral() {
            let whole = m.floor() as i64;
            if whole == 0 {
                return 0.0;
            }
            self.rng.gen_range(-whole..=whole) as f64
        } else {
            // Unit draw scaled up: the sampler's width stays 2 whatever `m` is.
            self.rng.gen_range(-1.0f64..=1.0) * m
        }
    }
}

/// Replays a fixed list of deltas in order, wrapping around.
///
/// An empty script always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDelta {
    script: Vec<f64>,
    pos: usize,
}

impl ScriptedDelta {
    pub fn new(script: Vec<f64>) -> Self {
        Self { script, pos: 0 }
    }

    /// Same delta for every draw.
    pub fn constant(delta: f64) -> Self {
        Self::new(vec![delta])
    }
}

impl DeltaSource for ScriptedDelta {
    fn draw(&mut self, _metric: &Metric) -> f64 {
        let Some(d) = self.script.get(self.pos % self.script.len().max(1)).copied() else {
            return 0.0;
        };
        self.pos = self.pos.wrapping_add(1);
        d
    }
}
