//! Simulator config loader (strict parsing).

pub mod schema;

use std::fs;

use aidpulse_core::error::{AidPulseError, Result};

pub use schema::{
    DisplayMode, KindSpec, KindsSection, MetricConfig, PanelConfig, SimConfig, SimulatorSection,
};

/// Env var overriding the config path.
pub const CONFIG_ENV: &str = "AIDPULSE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "aidpulse.yaml";

pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<SimConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| AidPulseError::BadConfig(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<SimConfig> {
    let cfg: SimConfig = serde_yaml::from_str(s)
        .map_err(|e| AidPulseError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
