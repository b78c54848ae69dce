//! Display layer: receives every published snapshot.
//!
//! Sinks get a shared reference and must render synchronously; the task that
//! owns the `MetricSet` keeps ownership, so a sink cannot mutate it.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;

use aidpulse_core::{Band, Metric, MetricKind, MetricSet};
use serde::Serialize;
use tokio::sync::mpsc;

/// One published snapshot. `seq == 0` is the seed published on mount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelUpdate {
    pub seq: u64,
    pub set: MetricSet,
}

impl PanelUpdate {
    pub fn panel(&self) -> &str {
        self.set.id()
    }
}

pub trait DisplaySink: Send + Sync {
    fn on_update(&self, update: &PanelUpdate);
}

fn fmt_value(m: &Metric) -> String {
    match m.kind() {
        MetricKind::Percentage => format!("{}%", m.value().round()),
        MetricKind::Count => format!("{}", m.value()),
    }
}

/// Renders each update as a single `tracing` event.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl LogDisplay {
    pub fn new() -> Self {
        Self
    }
}

/// `name=value` pairs in set order, with a `[band]` badge on anything not
/// healthy. Percentages are rounded for display.
pub fn render_line(set: &MetricSet) -> String {
    let mut line = String::new();
    for m in set {
        if !line.is_empty() {
            line.push(' ');
        }
        let _ = write!(line, "{}={}", m.name(), fmt_value(m));
        if m.band() != Band::Healthy {
            let _ = write!(line, "[{}]", m.band().label());
        }
    }
    line
}

impl DisplaySink for LogDisplay {
    fn on_update(&self, update: &PanelUpdate) {
        let mean = (update.set.mean().unwrap_or(0.0) * 10.0).round() / 10.0;
        tracing::info!(
            panel = %update.panel(),
            seq = update.seq,
            mean,
            "{}",
            render_line(&update.set)
        );

        for m in update.set.alerts() {
            tracing::warn!(panel = %update.panel(), metric = %m.name(), value = m.value(), "critical level");
        }
    }
}

/// Writes one JSON object per update, newline-delimited.
pub struct JsonDisplay {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonDisplay {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }
}

impl DisplaySink for JsonDisplay {
    fn on_update(&self, update: &PanelUpdate) {
        let Ok(mut out) = self.out.lock() else {
            tracing::error!(panel = %update.panel(), "json display writer poisoned");
            return;
        };
        if let Err(e) = write_line(&mut **out, update) {
            tracing::warn!(panel = %update.panel(), error = %e, "json display write failed");
        }
    }
}

fn write_line(out: &mut dyn Write, update: &PanelUpdate) -> io::Result<()> {
    serde_json::to_writer(&mut *out, update)?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Forwards owned copies of each update over an unbounded channel.
#[derive(Clone)]
pub struct ChannelDisplay {
    tx: mpsc::UnboundedSender<PanelUpdate>,
}

impl ChannelDisplay {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PanelUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DisplaySink for ChannelDisplay {
    fn on_update(&self, update: &PanelUpdate) {
        // Receiver gone means nobody is watching; nothing to do.
        let _ = self.tx.send(update.clone());
    }
}
