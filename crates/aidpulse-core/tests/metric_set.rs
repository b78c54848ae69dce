#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use aidpulse_core::{
    AidPulseError, Band, Metric, MetricKind, MetricSet, RandomDelta, ScriptedDelta, Thresholds,
    MAX_MAGNITUDE,
};

fn zone(medical: f64, food: f64, shelter: f64) -> MetricSet {
    MetricSet::new(
        "crisis-zone/test",
        vec![
            Metric::percentage("medical", medical).build().unwrap(),
            Metric::percentage("food", food).build().unwrap(),
            Metric::percentage("shelter", shelter).build().unwrap(),
        ],
    )
    .unwrap()
}

fn in_range(set: &MetricSet) -> bool {
    set.iter()
        .all(|m| m.value().is_finite() && m.value() >= m.min() && m.value() <= m.max())
}

#[test]
fn one_tick_updates_every_metric_independently() {
    let set = zone(65.0, 45.0, 80.0);
    let mut src = ScriptedDelta::new(vec![1.0, -2.0, 3.0]);

    let next = set.tick(&mut src);

    assert_eq!(next.get("medical").unwrap().value(), 66.0);
    assert_eq!(next.get("food").unwrap().value(), 43.0);
    assert_eq!(next.get("shelter").unwrap().value(), 83.0);
    assert!(in_range(&next));
    // tick is pure
    assert_eq!(set.get("medical").unwrap().value(), 65.0);
}

#[test]
fn tick_in_place_reports_clamps() {
    let mut set = zone(2.0, 50.0, 99.0);
    let mut src = ScriptedDelta::new(vec![-5.0, 5.0, 5.0]);

    let report = set.tick_in_place(&mut src);

    assert_eq!(report.updated, 3);
    assert_eq!(report.floor, 1);
    assert_eq!(report.ceiling, 1);
    assert_eq!(set.get("medical").unwrap().value(), 0.0);
    assert_eq!(set.get("shelter").unwrap().value(), 100.0);
}

#[test]
fn random_walk_stays_in_range_indefinitely() {
    let mut set = MetricSet::new(
        "mixed",
        vec![
            Metric::percentage("coverage", 0.0).build().unwrap(),
            Metric::percentage("rate", 100.0).magnitude(50.0).build().unwrap(),
            Metric::count("stock", 100.0).build().unwrap(),
            Metric::count("crises", 1.0).min(1.0).magnitude(1.0).build().unwrap(),
            Metric::percentage("narrow", 10.0).bounds(9.5, 10.5).build().unwrap(),
        ],
    )
    .unwrap();

    for seed in 0..8u64 {
        let mut src = RandomDelta::seeded(seed);
        for _ in 0..5_000 {
            set.tick_in_place(&mut src);
            assert!(in_range(&set), "seed={seed}");
        }
    }
}

#[test]
fn random_draws_respect_magnitude() {
    let base = Metric::percentage("p", 50.0).build().unwrap();
    let count = Metric::count("c", 50_000.0).build().unwrap();
    let mut src = RandomDelta::seeded(7);

    for _ in 0..2_000 {
        let mut p = base.clone();
        p.apply_delta(aidpulse_core::DeltaSource::draw(&mut src, &base));
        assert!((45.0..=55.0).contains(&p.value()));

        let d = aidpulse_core::DeltaSource::draw(&mut src, &count);
        assert!((-1000.0..=1000.0).contains(&d));
        assert_eq!(d.fract(), 0.0);
    }
}

#[test]
fn integral_kind_stays_whole() {
    let mut set = MetricSet::new("inventory", vec![Metric::count("rice", 20_000.0).build().unwrap()])
        .unwrap();
    let mut src = ScriptedDelta::new(vec![0.3, -0.7, 12.5]);
    for _ in 0..30 {
        set.tick_in_place(&mut src);
        assert_eq!(set.get("rice").unwrap().value().fract(), 0.0);
    }
}

#[test]
fn largest_magnitude_ticks_without_overflow() {
    let err = Metric::percentage("p", 50.0).magnitude(1e308).build().unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_METRIC");

    let mut set = MetricSet::new(
        "wide",
        vec![
            Metric::percentage("p", 50.0).magnitude(MAX_MAGNITUDE).build().unwrap(),
            Metric::count("c", 10.0).magnitude(MAX_MAGNITUDE).build().unwrap(),
        ],
    )
    .unwrap();
    let mut src = RandomDelta::seeded(1);
    for _ in 0..500 {
        set.tick_in_place(&mut src);
        assert!(in_range(&set));
        assert_eq!(set.get("c").unwrap().value().fract(), 0.0);
    }
}

#[test]
fn whole_step_metrics_reject_fractions() {
    let err = Metric::count("c", 1.5).build().unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_METRIC");

    for b in [Metric::count("c", 1.0).min(0.5), Metric::count("c", 1.0).max(2.5)] {
        let err = b.build().unwrap_err();
        assert!(matches!(err, AidPulseError::InvalidRange { .. }), "{err}");
    }

    // A fractional percentage is fine until it is asked to move in whole steps.
    assert!(Metric::percentage("p", 78.5).build().is_ok());
    assert!(Metric::percentage("p", 78.5).whole().build().is_err());
}

#[test]
fn whole_step_percentage_walk_stays_whole() {
    let m = Metric::percentage("medical-supplies", 85.0)
        .magnitude(2.0)
        .whole()
        .build()
        .unwrap();
    assert!(m.is_integral());
    assert_eq!(m.kind(), MetricKind::Percentage);

    let mut set = MetricSet::new("dashboard", vec![m]).unwrap();
    let mut src = RandomDelta::seeded(11);
    let mut prev = 85.0;
    for _ in 0..2_000 {
        set.tick_in_place(&mut src);
        let v = set.get("medical-supplies").unwrap().value();
        assert_eq!(v.fract(), 0.0);
        assert!((0.0..=100.0).contains(&v));
        assert!((v - prev).abs() <= 2.0);
        prev = v;
    }
}

#[test]
fn clamped_count_floor_stays_whole() {
    let mut m = Metric::count("crises", 1.0).min(1.0).build().unwrap();
    m.apply_delta(-3.0);
    assert_eq!(m.value(), 1.0);
    m.apply_delta(2.4);
    assert_eq!(m.value(), 3.0);
}

#[test]
fn zero_magnitude_never_moves() {
    let m = Metric::percentage("frozen", 33.0).magnitude(0.0).build().unwrap();
    let mut set = MetricSet::new("frozen", vec![m]).unwrap();
    let mut src = RandomDelta::seeded(1);
    for _ in 0..100 {
        set.tick_in_place(&mut src);
    }
    assert_eq!(set.get("frozen").unwrap().value(), 33.0);
}

#[test]
fn rejects_inverted_range() {
    let err = Metric::percentage("bad", 50.0).bounds(100.0, 0.0).build().unwrap_err();
    assert!(matches!(err, AidPulseError::InvalidRange { .. }));
    assert_eq!(err.code().as_str(), "INVALID_RANGE");
}

#[test]
fn rejects_unusable_bounds() {
    for (min, max) in [(f64::NAN, 1.0), (0.0, f64::NAN), (f64::NEG_INFINITY, 1.0)] {
        let err = Metric::builder("m", MetricKind::Count, 0.0)
            .bounds(min, max)
            .build()
            .unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_RANGE", "min={min} max={max}");
    }
}

#[test]
fn rejects_bad_seed_magnitude_and_thresholds() {
    let cases = [
        Metric::percentage("over", 101.0),
        Metric::count("under", -1.0),
        Metric::percentage("nan", f64::NAN),
        Metric::percentage("neg-step", 1.0).magnitude(-1.0),
        Metric::percentage("inf-step", 1.0).magnitude(f64::INFINITY),
        Metric::count("bands", 10.0).thresholds(Thresholds::new(100.0, 500.0)),
        Metric::count(" ", 10.0),
    ];
    for b in cases {
        let err = b.build().unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_METRIC", "{err}");
    }
}

#[test]
fn rejects_duplicate_names() {
    let err = MetricSet::new(
        "dup",
        vec![
            Metric::percentage("food", 1.0).build().unwrap(),
            Metric::percentage("food", 2.0).build().unwrap(),
        ],
    )
    .unwrap_err();
    assert_eq!(err.code().as_str(), "DUPLICATE_METRIC");
}

#[test]
fn bands_follow_thresholds() {
    let t = Thresholds::new(1500.0, 1000.0);
    assert_eq!(Band::of(2000.0, Some(&t)), Band::Healthy);
    assert_eq!(Band::of(1500.0, Some(&t)), Band::Low);
    assert_eq!(Band::of(1000.0, Some(&t)), Band::Critical);
    assert_eq!(Band::of(0.0, None), Band::Healthy);

    let only = Thresholds::critical_only(300.0);
    assert_eq!(Band::of(301.0, Some(&only)), Band::Healthy);
    assert_eq!(Band::of(300.0, Some(&only)), Band::Critical);
}

#[test]
fn alerts_and_aggregates() {
    let set = MetricSet::new(
        "inventory",
        vec![
            Metric::count("antibiotics", 900.0)
                .thresholds(Thresholds::critical_only(1000.0))
                .build()
                .unwrap(),
            Metric::count("rice", 20_000.0)
                .thresholds(Thresholds::critical_only(5000.0))
                .build()
                .unwrap(),
        ],
    )
    .unwrap();

    let alerts: Vec<&str> = set.alerts().map(|m| m.name()).collect();
    assert_eq!(alerts, vec!["antibiotics"]);
    assert_eq!(set.total(), 20_900.0);
    assert_eq!(set.mean(), Some(10_450.0));
    assert_eq!(MetricSet::new("empty", vec![]).unwrap().mean(), None);
}

#[test]
fn snapshot_serializes_open_ceiling_as_null() {
    let set = MetricSet::new("inv", vec![Metric::count("rice", 5.0).build().unwrap()]).unwrap();
    let v = serde_json::to_value(&set).unwrap();
    assert_eq!(v["id"], "inv");
    assert_eq!(v["metrics"][0]["kind"], "count");
    assert!(v["metrics"][0]["max"].is_null());
    assert_eq!(v["metrics"][0]["band"], "healthy");
}
