//! Single-metric tick vectors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use aidpulse_core::{Clamp, MetricSet, ScriptedDelta};

use vector_loader::{RejectVector, TestVector};

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

fn clamp_name(c: Clamp) -> &'static str {
    match c {
        Clamp::Within => "within",
        Clamp::Floor => "floor",
        Clamp::Ceiling => "ceiling",
    }
}

const FILES: [&str; 8] = [
    "clamp_floor.json",
    "clamp_ceiling.json",
    "within_range.json",
    "count_unbounded_above.json",
    "count_rounds_then_clamps.json",
    "non_finite_delta_ignored.json",
    "zero_width_range.json",
    "whole_percentage_rounds.json",
];

#[test]
fn apply_delta_vectors() {
    for f in FILES {
        let v = load(f);
        let mut m = v.metric.build();

        let mut last = Clamp::Within;
        for d in &v.deltas {
            last = m.apply_delta(d.value());
            assert!(m.value() >= m.min() && m.value() <= m.max(), "vector={}", v.description);
        }

        assert_eq!(m.value(), v.expect.value, "vector={}", v.description);
        assert_eq!(clamp_name(last), v.expect.clamp, "vector={}", v.description);
    }
}

#[test]
fn set_tick_matches_vectors() {
    for f in FILES {
        let v = load(f);
        let set = MetricSet::new("vector", vec![v.metric.build()]).unwrap();
        let mut src = ScriptedDelta::new(v.deltas.iter().map(|d| d.value()).collect());

        let mut snap = set.clone();
        for _ in &v.deltas {
            snap = snap.tick(&mut src);
        }

        let got = snap.get("vector").unwrap().value();
        assert_eq!(got, v.expect.value, "vector={}", v.description);
    }
}

#[test]
fn rejected_metric_vectors() {
    let s = fs::read_to_string("tests/vectors/rejected_metrics.json").unwrap();
    let vectors: Vec<RejectVector> = serde_json::from_str(&s).unwrap();
    assert!(!vectors.is_empty());

    for v in vectors {
        let err = v.metric.try_build().unwrap_err();
        assert_eq!(err.code().as_str(), v.error, "vector={}", v.description);
    }
}
