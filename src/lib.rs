//! trade-journal: discretionary trading journal with discipline guardrails
//!
//! This library provides the core components for:
//! - Fee schedules per instrument class
//! - Trade plan economics: principal, fees, loss at stop, profit at target, R:R
//! - Risk-based position sizing
//! - A position ledger with partial exits
//! - Daily loss circuit-breaker, losing-streak and overnight checks
//! - CSV persistence with single-file journal migration
//! - Structured logging and metrics

pub mod cli;
pub mod config;
pub mod data;
pub mod economics;
pub mod fees;
pub mod instrument;
pub mod ledger;
pub mod risk;
pub mod session;
pub mod telemetry;
