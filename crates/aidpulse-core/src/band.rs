//! Threshold bands used by the display layer to color badges.
//!
//! A metric may declare a `low` and a `critical` level. Values at or below
//! `critical` are `Critical`, values at or below `low` are `Low`, everything
//! else is `Healthy`.

use serde::Serialize;

/// Band a value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Healthy,
    Low,
    Critical,
}

impl Band {
    /// Classify `value` against optional thresholds.
    pub fn of(value: f64, thresholds: Option<&Thresholds>) -> Self {
        let Some(t) = thresholds else {
            return Band::Healthy;
        };
        if value <= t.critical {
            Band::Critical
        } else if value <= t.low {
            Band::Low
        } else {
            Band::Healthy
        }
    }

    /// Label matching the inventory badges.
    pub fn label(self) -> &'static str {
        match self {
            Band::Healthy => "in stock",
            Band::Low => "low stock",
            Band::Critical => "critical",
        }
    }
}

/// Band boundaries (`critical <= low`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub low: f64,
    pub critical: f64,
}

impl Thresholds {
    pub fn new(low: f64, critical: f64) -> Self {
        Self { low, critical }
    }

    /// Only a critical level; `Low` is never reported.
    pub fn critical_only(critical: f64) -> Self {
        Self { low: critical, critical }
    }

    /// Only a low level; `Critical` is reserved for an empty stock.
    pub fn low_only(low: f64) -> Self {
        Self { low, critical: 0.0 }
    }

    pub(crate) fn is_ordered(&self) -> bool {
        self.low.is_finite() && self.critical.is_finite() && self.critical <= self.low
    }
}
