//! Shared error type across AidPulse crates.

use thiserror::Error;

/// Stable error codes (safe to log and match on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric declared with `min > max` or unusable bounds.
    InvalidRange,
    /// Metric seed value, magnitude or thresholds are unusable.
    InvalidMetric,
    /// Two metrics in one set share a name.
    DuplicateMetric,
    /// Configuration could not be read or failed validation.
    BadConfig,
    /// Unsupported configuration version.
    UnsupportedVersion,
    /// Panel id already mounted.
    PanelConflict,
    /// Panel id not mounted.
    UnknownPanel,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and display output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidRange => "INVALID_RANGE",
            ErrorCode::InvalidMetric => "INVALID_METRIC",
            ErrorCode::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::PanelConflict => "PANEL_CONFLICT",
            ErrorCode::UnknownPanel => "UNKNOWN_PANEL",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AidPulseError>;

/// Unified error type used by core and sim.
#[derive(Debug, Error)]
pub enum AidPulseError {
    #[error("invalid range for metric {metric}: min={min} max={max}")]
    InvalidRange { metric: String, min: f64, max: f64 },
    #[error("invalid metric {metric}: {reason}")]
    InvalidMetric { metric: String, reason: String },
    #[error("duplicate metric {metric} in set {set}")]
    DuplicateMetric { set: String, metric: String },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("panel already mounted: {0}")]
    PanelConflict(String),
    #[error("unknown panel: {0}")]
    UnknownPanel(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl AidPulseError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            AidPulseError::InvalidRange { .. } => ErrorCode::InvalidRange,
            AidPulseError::InvalidMetric { .. } => ErrorCode::InvalidMetric,
            AidPulseError::DuplicateMetric { .. } => ErrorCode::DuplicateMetric,
            AidPulseError::BadConfig(_) => ErrorCode::BadConfig,
            AidPulseError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            AidPulseError::PanelConflict(_) => ErrorCode::PanelConflict,
            AidPulseError::UnknownPanel(_) => ErrorCode::UnknownPanel,
            AidPulseError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub(crate) fn invalid_metric(metric: &str, reason: impl Into<String>) -> Self {
        AidPulseError::InvalidMetric {
            metric: metric.to_string(),
            reason: reason.into(),
        }
    }
}
