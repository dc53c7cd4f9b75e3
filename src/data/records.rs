//! Row types of the journal files
//!
//! Money columns are written as decimal strings so a save/load cycle is exact.

use crate::economics::Direction;
use crate::instrument::InstrumentClass;
use crate::ledger::{Execution, ExitReason, Position, PositionId, PositionStatus};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Column order of `positions.csv`
pub const POSITION_COLUMNS: [&str; 19] = [
    "id",
    "date",
    "market",
    "symbol",
    "direction",
    "entry",
    "qty_display",
    "actual_shares",
    "stop_price",
    "target_price",
    "target_price_2",
    "invested",
    "fees",
    "exit_price",
    "net_pl",
    "status",
    "remaining_qty",
    "fees_charged",
    "rationale",
];

/// Column order of `executions.csv`
pub const EXECUTION_COLUMNS: [&str; 8] = [
    "position_id",
    "date",
    "executed_at",
    "exit_price",
    "quantity",
    "net_pl",
    "fees",
    "reason",
];

/// One row of `positions.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: PositionId,
    pub date: NaiveDate,
    pub market: InstrumentClass,
    pub symbol: String,
    pub direction: Direction,
    #[serde(with = "rust_decimal::serde::str")]
    pub entry: Decimal,
    pub qty_display: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub actual_shares: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub stop_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub target_price: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub target_price_2: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub invested: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub fees: Decimal,
    /// Volume-weighted average exit price
    #[serde(with = "rust_decimal::serde::str")]
    pub exit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub net_pl: Decimal,
    pub status: PositionStatus,
    pub remaining_qty: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub fees_charged: Decimal,
    #[serde(default)]
    pub rationale: String,
}

impl From<&Position> for PositionRecord {
    fn from(p: &Position) -> Self {
        Self {
            id: p.id,
            date: p.opened_on,
            market: p.class,
            symbol: p.symbol.clone(),
            direction: p.direction,
            entry: p.entry_price,
            qty_display: p.quantity,
            actual_shares: p.actual_units,
            stop_price: p.stop_price,
            target_price: p.target_price,
            target_price_2: p.target_price_2,
            invested: p.principal,
            fees: p.fees,
            exit_price: p.average_exit_price,
            net_pl: p.realized_pnl,
            status: p.status,
            remaining_qty: p.remaining_quantity,
            fees_charged: p.fees_charged,
            rationale: p.rationale.clone(),
        }
    }
}

impl From<PositionRecord> for Position {
    fn from(r: PositionRecord) -> Self {
        Self {
            id: r.id,
            opened_on: r.date,
            class: r.market,
            symbol: r.symbol,
            direction: r.direction,
            entry_price: r.entry,
            quantity: r.qty_display,
            remaining_quantity: r.remaining_qty,
            actual_units: r.actual_shares,
            stop_price: r.stop_price,
            target_price: r.target_price,
            target_price_2: r.target_price_2,
            principal: r.invested,
            fees: r.fees,
            fees_charged: r.fees_charged,
            average_exit_price: r.exit_price,
            realized_pnl: r.net_pl,
            status: r.status,
            rationale: r.rationale,
        }
    }
}

/// One row of `executions.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub position_id: PositionId,
    pub date: NaiveDate,
    pub executed_at: NaiveDateTime,
    #[serde(with = "rust_decimal::serde::str")]
    pub exit_price: Decimal,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub net_pl: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub fees: Decimal,
    pub reason: ExitReason,
}

impl From<&Execution> for ExecutionRecord {
    fn from(e: &Execution) -> Self {
        Self {
            position_id: e.position_id,
            date: e.date,
            executed_at: e.executed_at,
            exit_price: e.exit_price,
            quantity: e.quantity,
            net_pl: e.net_pnl,
            fees: e.fees,
            reason: e.reason,
        }
    }
}

impl From<ExecutionRecord> for Execution {
    fn from(r: ExecutionRecord) -> Self {
        Self {
            position_id: r.position_id,
            date: r.date,
            executed_at: r.executed_at,
            exit_price: r.exit_price,
            quantity: r.quantity,
            net_pnl: r.net_pl,
            fees: r.fees,
            reason: r.reason,
        }
    }
}
