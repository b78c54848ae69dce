//! Periodic driver for mounted panels.
//!
//! `Simulator` owns the registry and hands each panel its own
//! `PanelTask`; `PanelHandle` is the scoped owner of a running timer.

mod panel_registry;
mod panel_task;
mod simulator;

pub use panel_registry::PanelRegistry;
pub use panel_task::{PanelHandle, PanelTask};
pub use simulator::Simulator;
