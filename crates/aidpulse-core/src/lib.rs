//! AidPulse core: bounded metrics, the perturb-and-clamp tick, and the
//! shared error surface.
//!
//! This crate carries no runtime or timer dependencies. The periodic driver
//! and display plumbing live in `aidpulse-sim`; everything here is plain,
//! synchronous data manipulation that can be tested without a clock.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Bad input surfaces
//! as `AidPulseError` at construction time; ticking cannot fail.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod band;
pub mod delta;
pub mod error;
pub mod metric;

pub use band::{Band, Thresholds};
pub use delta::{DeltaSource, RandomDelta, ScriptedDelta};
/// Shared result type.
pub use error::{AidPulseError, ErrorCode, Result};
pub use metric::{Clamp, Metric, MetricBuilder, MetricKind, MetricSet, TickReport, MAX_MAGNITUDE};
