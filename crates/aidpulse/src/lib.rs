//! Top-level facade crate for AidPulse.
//!
//! Re-exports the metric model and the simulator runtime so users can depend
//! on a single crate.

pub mod core {
    pub use aidpulse_core::*;
}

pub mod sim {
    pub use aidpulse_sim::*;
}
