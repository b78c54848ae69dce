//! AidPulse live-metrics simulator.
//!
//! - Loads `aidpulse.yaml` (or `$AIDPULSE_CONFIG`)
//! - Mounts one ticking panel per configured `MetricSet`
//! - Runs single-threaded until Ctrl-C, then tears every panel down

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use aidpulse_sim::{app_state, config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = config::config_path();
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, code = e.code().as_str(), error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let state = match app_state::AppState::new(cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    let sim = state.simulator();
    tracing::info!(
        %path,
        interval_ms = state.cfg().simulator.tick_interval_ms,
        "aidpulse-sim starting"
    );

    if let Err(e) = state.start() {
        tracing::error!(code = e.code().as_str(), error = %e, "mount failed");
        sim.shutdown().await;
        return ExitCode::FAILURE;
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }

    sim.shutdown().await;
    tracing::info!("\n{}", state.metrics().render());
    ExitCode::SUCCESS
}
