//! Positions and executions held by the ledger

use crate::economics::Direction;
use crate::instrument::InstrumentClass;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::{NoContext, Timestamp, Uuid};

/// Time-ordered position identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(Uuid);

impl PositionId {
    /// Derive a new identifier from the creation time
    pub fn from_time(at: NaiveDateTime) -> Self {
        let utc = at.and_utc();
        let ts = Timestamp::from_unix(
            NoContext,
            utc.timestamp().max(0) as u64,
            utc.timestamp_subsec_nanos(),
        );
        Self(Uuid::new_v7(ts))
    }

    /// Creation time encoded in the identifier, to the millisecond
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        let (secs, nanos) = self.0.get_timestamp()?.to_unix();
        DateTime::from_timestamp(secs as i64, nanos).map(|dt| dt.naive_utc())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PositionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Position lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    /// No exit yet
    Open,
    /// Some, but not all, quantity exited
    #[serde(rename = "Half-Closed")]
    HalfClosed,
    /// Fully exited
    Closed,
}

impl PositionStatus {
    /// Status implied by the initial and remaining quantity
    pub fn for_quantities(initial: u32, remaining: u32) -> Self {
        if remaining == 0 {
            PositionStatus::Closed
        } else if remaining < initial {
            PositionStatus::HalfClosed
        } else {
            PositionStatus::Open
        }
    }

    /// Open or half-closed
    pub fn is_active(&self) -> bool {
        !matches!(self, PositionStatus::Closed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PositionStatus::Open => "Open",
            PositionStatus::HalfClosed => "Half-Closed",
            PositionStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an exit happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Manual,
    #[serde(rename = "Stop")]
    StopTriggered,
    #[serde(rename = "Target")]
    TargetTriggered,
}

impl ExitReason {
    /// Classify an exit price against the position's stop and primary target
    pub fn infer(position: &Position, exit_price: Decimal) -> Self {
        let entry = position.entry_price;
        // at or beyond a level, measured away from entry
        let through = |level: Decimal| {
            if level < entry {
                exit_price <= level
            } else {
                exit_price >= level
            }
        };

        if through(position.stop_price) {
            ExitReason::StopTriggered
        } else if through(position.target_price) {
            ExitReason::TargetTriggered
        } else {
            ExitReason::Manual
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExitReason::Manual => "Manual",
            ExitReason::StopTriggered => "Stop",
            ExitReason::TargetTriggered => "Target",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExitReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(ExitReason::Manual),
            "stop" | "stop-triggered" => Ok(ExitReason::StopTriggered),
            "target" | "target-triggered" => Ok(ExitReason::TargetTriggered),
            other => Err(format!("unknown exit reason: {other}")),
        }
    }
}

/// A tracked position
///
/// Only the ledger's lifecycle transitions change `remaining_quantity`,
/// `status`, `realized_pnl`, `fees_charged` and `average_exit_price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub id: PositionId,
    pub opened_on: NaiveDate,
    pub class: InstrumentClass,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    /// Initial display quantity
    pub quantity: u32,
    pub remaining_quantity: u32,
    /// Initial quantity × multiplier
    pub actual_units: Decimal,
    pub stop_price: Decimal,
    pub target_price: Decimal,
    pub target_price_2: Option<Decimal>,
    pub principal: Decimal,
    /// Planned round-trip fee for the whole position
    pub fees: Decimal,
    /// Fees charged by executions so far
    pub fees_charged: Decimal,
    /// Volume-weighted exit price, zero before the first exit
    pub average_exit_price: Decimal,
    /// Sum of net P&L over all executions
    pub realized_pnl: Decimal,
    pub status: PositionStatus,
    pub rationale: String,
}

impl Position {
    pub fn exited_quantity(&self) -> u32 {
        self.quantity - self.remaining_quantity
    }

    pub fn remaining_units(&self) -> Decimal {
        self.class.actual_units(self.remaining_quantity)
    }

    /// Mark-to-market P&L of the remaining quantity, before fees
    pub fn unrealized_pnl(&self, mark_price: Decimal) -> Decimal {
        (mark_price - self.entry_price) * self.remaining_units() * self.direction.sign()
    }

    /// Loss on the remaining quantity if the stop is hit, including outstanding planned fees
    pub fn risk_to_stop(&self) -> Decimal {
        let price_risk =
            (self.entry_price - self.stop_price) * self.remaining_units() * self.direction.sign();
        price_risk + (self.fees - self.fees_charged).max(Decimal::ZERO)
    }

    /// Still held in an instrument that must be flat by the close
    pub fn violates_overnight(&self) -> bool {
        self.status.is_active() && self.class.forbids_overnight()
    }
}

/// An exit of part or all of a position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub position_id: PositionId,
    pub date: NaiveDate,
    pub executed_at: NaiveDateTime,
    pub exit_price: Decimal,
    pub quantity: u32,
    pub net_pnl: Decimal,
    pub fees: Decimal,
    pub reason: ExitReason,
}

impl Execution {
    pub fn is_loss(&self) -> bool {
        self.net_pnl < Decimal::ZERO
    }
}
