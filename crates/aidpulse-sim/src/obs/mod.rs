//! In-process simulator counters.
//!
//! Counters are atomics keyed by label sets and rendered in Prometheus text
//! format. The binary logs the rendering at shutdown; embedders can call
//! `SimMetrics::render` whenever they like.

pub mod metrics;

pub use metrics::SimMetrics;
