//! AidPulse simulator library entry.
//!
//! Wires config, the built-in mock panels, the per-panel periodic driver and
//! the display sinks together. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod display;
pub mod mock;
pub mod obs;
pub mod runtime;
