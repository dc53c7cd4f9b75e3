//! Journal metrics

use crate::instrument::InstrumentClass;
use crate::ledger::{Execution, Position};
use crate::risk::GuardReport;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Realized P&L for the evaluated day
    RealizedPnlToday,
    /// Current losing streak
    ConsecutiveLosses,
    /// Open and half-closed positions
    OpenPositions,
    /// Positions that must not be held overnight
    OvernightViolations,
    /// 1 when the circuit breaker is engaged
    TradingLocked,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    PositionsOpened,
    ExecutionsApplied,
    LosingExecutions,
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::RealizedPnlToday => "journal_realized_pnl_today",
        GaugeMetric::ConsecutiveLosses => "journal_consecutive_losses",
        GaugeMetric::OpenPositions => "journal_open_positions",
        GaugeMetric::OvernightViolations => "journal_overnight_violations",
        GaugeMetric::TradingLocked => "journal_trading_locked",
    }
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::PositionsOpened => "journal_positions_opened_total",
        CounterMetric::ExecutionsApplied => "journal_executions_applied_total",
        CounterMetric::LosingExecutions => "journal_losing_executions_total",
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = gauge_name(metric);
    metrics::gauge!(metric_name).set(value);
    tracing::trace!(metric = metric_name, value, "Setting gauge");
}

/// Increment a counter, labelled by instrument class
pub fn increment_counter(metric: CounterMetric, class: &'static str) {
    metrics::counter!(counter_name(metric), "class" => class).increment(1);
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

pub fn record_position_opened(position: &Position) {
    increment_counter(CounterMetric::PositionsOpened, position.class.label());
}

pub fn record_execution(execution: &Execution, class: InstrumentClass) {
    increment_counter(CounterMetric::ExecutionsApplied, class.label());
    if execution.is_loss() {
        increment_counter(CounterMetric::LosingExecutions, class.label());
    }
}

/// Publish the discipline state
pub fn record_guard(report: &GuardReport, open_positions: usize) {
    set_gauge(
        GaugeMetric::RealizedPnlToday,
        as_f64(report.realized_pl_today),
    );
    set_gauge(
        GaugeMetric::ConsecutiveLosses,
        report.consecutive_losses as f64,
    );
    set_gauge(GaugeMetric::OpenPositions, open_positions as f64);
    set_gauge(
        GaugeMetric::OvernightViolations,
        report.overnight_violations.len() as f64,
    );
    set_gauge(
        GaugeMetric::TradingLocked,
        if report.is_locked { 1.0 } else { 0.0 },
    );
}
