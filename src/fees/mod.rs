//! Fee model
//!
//! Round-trip brokerage fee estimates per instrument class

mod schedules;

pub use schedules::{AdValoremFees, PerContractFees, PerShareFees};

use crate::config::FeeConfig;
use crate::instrument::{FeeScheduleKind, InstrumentClass};
use rust_decimal::Decimal;

/// Trait for broker fee schedules
pub trait FeeSchedule: Send + Sync {
    /// Fee for a single leg (entry or exit)
    fn one_way(&self, quantity: u32, notional: Decimal) -> Decimal;

    /// Fee for entering and exiting
    fn round_trip(&self, quantity: u32, notional: Decimal) -> Decimal {
        self.one_way(quantity, notional) * Decimal::TWO
    }

    /// Get the schedule name
    fn name(&self) -> &'static str;
}

/// Dispatches fee estimates to the schedule of each instrument class
#[derive(Debug, Clone, Default)]
pub struct FeeModel {
    pub option: PerContractFees,
    pub equity: PerShareFees,
    pub hk: AdValoremFees,
}

impl FeeModel {
    /// Create from FeeConfig
    pub fn from_config(config: &FeeConfig) -> Self {
        Self {
            option: config.option.clone(),
            equity: config.equity.clone(),
            hk: config.hk.clone(),
        }
    }

    /// Schedule that prices the given instrument class
    pub fn schedule(&self, class: InstrumentClass) -> &dyn FeeSchedule {
        match class.fee_schedule() {
            FeeScheduleKind::PerContract => &self.option,
            FeeScheduleKind::PerShare => &self.equity,
            FeeScheduleKind::AdValorem => &self.hk,
        }
    }

    /// Round-trip fee estimate
    ///
    /// `quantity` is in display units (contracts, lots, shares); `notional`
    /// is price × quantity × multiplier. Never negative.
    pub fn estimate_fee(&self, class: InstrumentClass, quantity: u32, notional: Decimal) -> Decimal {
        self.schedule(class)
            .round_trip(quantity, notional)
            .max(Decimal::ZERO)
    }
}
