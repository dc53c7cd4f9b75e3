//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use self::logging::{init_logging, LogFormat};
pub use self::metrics::{
    increment_counter, record_execution, record_guard, record_position_opened, set_gauge,
    CounterMetric, GaugeMetric,
};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
///
/// Metrics go through the `metrics` facade and are dropped unless the
/// embedding application installs a recorder.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format)?;
    Ok(())
}
