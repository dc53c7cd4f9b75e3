//! Trade ledger
//!
//! Positions, their executions, and the lifecycle transitions that are the
//! only way to change them.

mod lifecycle;
mod position;
mod types;

pub use position::{Execution, ExitReason, Position, PositionId, PositionStatus};
pub use types::LedgerError;

use crate::economics::{MAX_AMOUNT, MAX_PRICE};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Requested exit of part or all of a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitOrder {
    pub price: Decimal,
    /// Display units to exit
    pub quantity: u32,
    /// Inferred from stop/target when absent
    pub reason: Option<ExitReason>,
}

impl ExitOrder {
    pub fn new(price: Decimal, quantity: u32) -> Self {
        Self {
            price,
            quantity,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: ExitReason) -> Self {
        self.reason = Some(reason);
        self
    }
}

/// All positions and executions of a journal
///
/// Executions are kept in the order they happened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    positions: Vec<Position>,
    executions: Vec<Execution>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored records, checking every invariant
    ///
    /// Nothing is recomputed: stored amounts are taken as-is, but a record
    /// set that contradicts itself is rejected as a whole.
    pub fn from_records(
        positions: Vec<Position>,
        executions: Vec<Execution>,
    ) -> Result<Self, LedgerError> {
        let mut exits: HashMap<PositionId, (u32, Decimal, Decimal)> =
            positions.iter().map(|p| (p.id, Default::default())).collect();

        if exits.len() != positions.len() {
            let mut seen = std::collections::HashSet::new();
            let duplicate = positions.iter().find(|p| !seen.insert(p.id));
            return Err(LedgerError::Inconsistent {
                id: duplicate.map(|p| p.id.to_string()).unwrap_or_default(),
                reason: "duplicate position id".to_string(),
            });
        }

        for execution in &executions {
            let inconsistent = |reason: &str| LedgerError::Inconsistent {
                id: execution.position_id.to_string(),
                reason: reason.to_string(),
            };
            let entry = exits
                .get_mut(&execution.position_id)
                .ok_or_else(|| inconsistent("execution references an unknown position"))?;
            if execution.quantity == 0 {
                return Err(inconsistent("execution with zero quantity"));
            }
            check_range(
                &execution.position_id,
                &[("exit price", execution.exit_price)],
                &[("net P&L", execution.net_pnl), ("fees", execution.fees)],
            )?;
            entry.0 = entry
                .0
                .checked_add(execution.quantity)
                .ok_or_else(|| inconsistent("executed quantity overflows"))?;
            entry.1 = entry
                .1
                .checked_add(execution.net_pnl)
                .ok_or_else(|| inconsistent("net P&L overflows"))?;
            entry.2 = entry
                .2
                .checked_add(execution.fees)
                .ok_or_else(|| inconsistent("fees overflow"))?;
        }

        for position in &positions {
            let (exited, pnl, fees) = exits[&position.id];
            let inconsistent = |reason: String| LedgerError::Inconsistent {
                id: position.id.to_string(),
                reason,
            };

            if position.quantity == 0 {
                return Err(inconsistent("zero initial quantity".to_string()));
            }
            check_range(
                &position.id,
                &[
                    ("entry", position.entry_price),
                    ("stop", position.stop_price),
                    ("target", position.target_price),
                    ("second target", position.target_price_2.unwrap_or_default()),
                    ("exit price", position.average_exit_price),
                ],
                &[
                    ("principal", position.principal),
                    ("fees", position.fees),
                    ("fees charged", position.fees_charged),
                    ("net P&L", position.realized_pnl),
                ],
            )?;
            if position.remaining_quantity.checked_add(exited) != Some(position.quantity) {
                return Err(inconsistent(format!(
                    "remaining {} + exited {} != initial {}",
                    position.remaining_quantity, exited, position.quantity
                )));
            }
            let expected = PositionStatus::for_quantities(position.quantity, position.remaining_quantity);
            if position.status != expected {
                return Err(inconsistent(format!(
                    "status {} but quantities imply {}",
                    position.status, expected
                )));
            }
            if position.realized_pnl != pnl {
                return Err(inconsistent(format!(
                    "net P&L {} != sum of executions {}",
                    position.realized_pnl, pnl
                )));
            }
            if position.fees_charged != fees {
                return Err(inconsistent(format!(
                    "fees charged {} != sum of executions {}",
                    position.fees_charged, fees
                )));
            }
        }

        Ok(Self {
            positions,
            executions,
        })
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn executions(&self) -> &[Execution] {
        &self.executions
    }

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn executions_for(&self, id: PositionId) -> impl Iterator<Item = &Execution> {
        self.executions.iter().filter(move |e| e.position_id == id)
    }

    /// Executions on a trading day, in chronological order
    pub fn executions_on(&self, date: NaiveDate) -> impl Iterator<Item = &Execution> {
        self.executions.iter().filter(move |e| e.date == date)
    }

    /// Open and half-closed positions
    pub fn active_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.status.is_active())
    }

    pub fn positions_opened_on(&self, date: NaiveDate) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(move |p| p.opened_on == date)
    }

    /// Realized P&L over the whole history
    pub fn realized_pnl(&self) -> Decimal {
        self.executions.iter().map(|e| e.net_pnl).sum()
    }

    /// Number of positions
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Reject stored prices and amounts too large to compute with
fn check_range(
    id: &PositionId,
    prices: &[(&str, Decimal)],
    amounts: &[(&str, Decimal)],
) -> Result<(), LedgerError> {
    let bounded = prices
        .iter()
        .map(|(field, value)| (*field, value.abs(), MAX_PRICE))
        .chain(amounts.iter().map(|(field, value)| (*field, value.abs(), MAX_AMOUNT)));
    for (field, value, max) in bounded {
        if value > max {
            return Err(LedgerError::Inconsistent {
                id: id.to_string(),
                reason: format!("{field} {value} is out of range"),
            });
        }
    }
    Ok(())
}
