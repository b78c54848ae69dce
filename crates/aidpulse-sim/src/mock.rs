//! Built-in mock panels mounted when the config declares none.
//!
//! Seed values, bounds and step sizes mirror the dashboard pages they stand
//! in for: crisis-zone aid coverage, live inventory, resource distribution,
//! and the headline KPIs.

use aidpulse_core::error::Result;
use aidpulse_core::{Metric, MetricKind, MetricSet, Thresholds};

use crate::config::KindsSection;

/// (panel id, medical, food, shelter)
const CRISIS_ZONES: [(&str, f64, f64, f64); 3] = [
    ("crisis-zone/northern-region", 65.0, 45.0, 80.0),
    ("crisis-zone/southern-region", 75.0, 60.0, 70.0),
    ("crisis-zone/eastern-region", 85.0, 80.0, 90.0),
];

/// (metric, stock, critical level)
const INVENTORY: [(&str, f64, f64); 5] = [
    ("antibiotics", 5000.0, 1000.0),
    ("bandages", 10000.0, 2000.0),
    ("rice", 20000.0, 5000.0),
    ("water-bottles", 30000.0, 10000.0),
    ("vitamins", 15000.0, 3000.0),
];

/// (metric, quantity, low-stock threshold)
const DISTRIBUTION_STOCK: [(&str, f64, f64); 3] = [
    ("antibiotics", 500.0, 1000.0),
    ("emergency-food-kits", 2000.0, 1500.0),
    ("vitamin-supplements", 100.0, 300.0),
];

pub fn default_panels(kinds: &KindsSection) -> Result<Vec<MetricSet>> {
    let mut out = Vec::with_capacity(CRISIS_ZONES.len() + 3);
    for (id, medical, food, shelter) in CRISIS_ZONES {
        out.push(crisis_zone(id, medical, food, shelter, kinds)?);
    }
    out.push(inventory(kinds)?);
    out.push(distribution()?);
    out.push(dashboard()?);
    Ok(out)
}

pub fn crisis_zone(
    id: &str,
    medical: f64,
    food: f64,
    shelter: f64,
    kinds: &KindsSection,
) -> Result<MetricSet> {
    let step = kinds.magnitude_for(MetricKind::Percentage);
    MetricSet::new(
        id,
        vec![
            Metric::percentage("medical", medical).magnitude(step).build()?,
            Metric::percentage("food", food).magnitude(step).build()?,
            Metric::percentage("shelter", shelter).magnitude(step).build()?,
        ],
    )
}

pub fn inventory(kinds: &KindsSection) -> Result<MetricSet> {
    let step = kinds.magnitude_for(MetricKind::Count);
    let metrics = INVENTORY
        .iter()
        .map(|&(name, stock, critical)| {
            Metric::count(name, stock)
                .magnitude(step)
                .thresholds(Thresholds::critical_only(critical))
                .build()
        })
        .collect::<Result<Vec<_>>>()?;
    MetricSet::new("inventory", metrics)
}

pub fn distribution() -> Result<MetricSet> {
    let mut metrics = vec![Metric::percentage("distribution-rate", 92.0)
        .magnitude(1.0)
        .build()?];
    for &(name, qty, low) in &DISTRIBUTION_STOCK {
        metrics.push(
            Metric::count(name, qty)
                .magnitude(10.0)
                .thresholds(Thresholds::low_only(low))
                .build()?,
        );
    }
    MetricSet::new("distribution", metrics)
}

pub fn dashboard() -> Result<MetricSet> {
    MetricSet::new(
        "dashboard",
        vec![
            Metric::count("active-patients", 2350.0).magnitude(5.0).build()?,
            Metric::count("active-crises", 12.0).min(1.0).magnitude(1.0).build()?,
            Metric::percentage("medical-supplies", 85.0)
                .magnitude(2.0)
                .whole()
                .build()?,
            Metric::count("response-time", 24.0).min(1.0).magnitude(2.0).build()?,
        ],
    )
}
