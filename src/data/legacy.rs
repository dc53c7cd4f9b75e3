//! Single-file journal migration
//!
//! The first version of the journal kept one row per trade in a single CSV
//! (`ID,Date,Market,Symbol,Entry,Qty_Display,...,Net_P_L,Status`) with the
//! trade's open time as `HHMMSS` in the `ID` column and no execution history.
//! Closed rows are migrated into a position plus one execution for the full
//! quantity.

use super::store::{read_records, LedgerStore};
use super::StoreError;
use crate::economics::Direction;
use crate::instrument::InstrumentClass;
use crate::ledger::{Execution, ExitReason, Ledger, Position, PositionId, PositionStatus};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LEGACY_MARKERS: [&str; 3] = ["Qty_Display", "Actual_Shares", "Net_P_L"];

#[derive(Debug, Deserialize)]
struct LegacyRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Market")]
    market: String,
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Entry")]
    entry: String,
    #[serde(rename = "Qty_Display")]
    qty_display: String,
    #[serde(rename = "Actual_Shares")]
    actual_shares: String,
    #[serde(rename = "Stop_Price")]
    stop_price: String,
    #[serde(rename = "Target_Price")]
    target_price: String,
    #[serde(rename = "Invested")]
    invested: String,
    #[serde(rename = "Fees")]
    fees: String,
    #[serde(rename = "Exit_Price")]
    exit_price: String,
    #[serde(rename = "Net_P_L")]
    net_pl: String,
    #[serde(rename = "Status")]
    status: String,
}

/// Whether a header row belongs to a single-file journal
pub fn is_legacy_header(headers: &csv::StringRecord) -> bool {
    LEGACY_MARKERS
        .iter()
        .all(|marker| headers.iter().any(|h| h.trim() == *marker))
}

/// Read-only store over a single-file journal
#[derive(Debug, Clone)]
pub struct LegacyJournal {
    path: PathBuf,
}

impl LegacyJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for LegacyJournal {
    fn load(&self) -> Result<Ledger, StoreError> {
        let rows: Vec<LegacyRow> = read_records(&self.path)?;
        let mut positions = Vec::with_capacity(rows.len());
        let mut executions = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            let malformed = |message: String| StoreError::Malformed {
                file: self.path.clone(),
                record: i + 1,
                message,
            };
            let (position, execution) = migrate_row(row).map_err(malformed)?;
            positions.push(position);
            executions.extend(execution);
        }

        // executions are kept in the order they happened
        executions.sort_by_key(|e: &Execution| e.executed_at);

        let ledger = Ledger::from_records(positions, executions)?;
        tracing::info!(
            path = %self.path.display(),
            positions = ledger.len(),
            "Migrated single-file journal"
        );
        Ok(ledger)
    }

    fn save(&self, _ledger: &Ledger) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly(self.path.clone()))
    }
}

fn migrate_row(row: LegacyRow) -> Result<(Position, Option<Execution>), String> {
    let class = InstrumentClass::from_str(&row.market).map_err(|e| e.to_string())?;
    let opened_at = row.date.and_time(parse_open_time(&row.id)?);
    let quantity = parse_quantity(&row.qty_display)?;

    let mut position = Position {
        id: PositionId::from_time(opened_at),
        opened_on: row.date,
        class,
        symbol: row.symbol.trim().to_uppercase(),
        direction: Direction::Long,
        entry_price: parse_amount("Entry", &row.entry)?,
        quantity,
        remaining_quantity: quantity,
        actual_units: parse_amount("Actual_Shares", &row.actual_shares)?,
        stop_price: parse_amount("Stop_Price", &row.stop_price)?,
        target_price: parse_amount("Target_Price", &row.target_price)?,
        target_price_2: None,
        principal: parse_amount("Invested", &row.invested)?,
        fees: parse_amount("Fees", &row.fees)?,
        fees_charged: Decimal::ZERO,
        average_exit_price: Decimal::ZERO,
        realized_pnl: Decimal::ZERO,
        status: PositionStatus::Open,
        rationale: String::new(),
    };

    match row.status.trim() {
        "Open" => Ok((position, None)),
        "Closed" => {
            let exit_price = parse_amount("Exit_Price", &row.exit_price)?;
            let net_pnl = parse_amount("Net_P_L", &row.net_pl)?;

            position.remaining_quantity = 0;
            position.status = PositionStatus::Closed;
            position.average_exit_price = exit_price;
            position.realized_pnl = net_pnl;
            position.fees_charged = position.fees;

            // the close time was never recorded
            let execution = Execution {
                position_id: position.id,
                date: row.date,
                executed_at: opened_at,
                exit_price,
                quantity,
                net_pnl,
                fees: position.fees,
                reason: ExitReason::Manual,
            };
            Ok((position, Some(execution)))
        }
        other => Err(format!("unknown status {other:?}")),
    }
}

/// `HHMMSS`, possibly with leading zeros lost
fn parse_open_time(id: &str) -> Result<NaiveTime, String> {
    let digits = id.trim().trim_end_matches(".0");
    let padded = format!("{digits:0>6}");
    NaiveTime::parse_from_str(&padded, "%H%M%S").map_err(|e| format!("ID {id:?}: {e}"))
}

fn parse_quantity(raw: &str) -> Result<u32, String> {
    let qty = parse_amount("Qty_Display", raw)?;
    if !qty.fract().is_zero() || qty <= Decimal::ZERO {
        return Err(format!("Qty_Display {raw:?} is not a positive whole number"));
    }
    qty.to_u32()
        .ok_or_else(|| format!("Qty_Display {raw:?} out of range"))
}

/// Decimal amount, tolerating the exponent notation spreadsheets write
fn parse_amount(column: &str, raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| format!("{column} {raw:?}: {e}"))
}
