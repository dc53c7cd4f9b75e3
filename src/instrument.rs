//! Instrument classes and their contract terms

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Broad product kind an instrument class belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// Listed option contract
    OptionContract,
    /// Warrant or callable bull/bear contract
    WarrantCbbc,
    /// Ordinary shares
    CashEquity,
}

/// Which fee schedule prices an instrument class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeScheduleKind {
    /// Fixed rate per contract with a minimum
    PerContract,
    /// Fixed rate per share with a minimum
    PerShare,
    /// Percentage of notional plus fixed platform/settlement charges
    AdValorem,
}

/// Tradable instrument class
///
/// Serialized with the labels used in the journal file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentClass {
    #[serde(rename = "US Option")]
    UsOption,
    #[serde(rename = "HK CBBC")]
    HkCbbc,
    #[serde(rename = "US Stock")]
    UsStock,
    #[serde(rename = "HK Stock")]
    HkStock,
}

impl InstrumentClass {
    pub const ALL: [InstrumentClass; 4] = [
        InstrumentClass::UsOption,
        InstrumentClass::HkCbbc,
        InstrumentClass::UsStock,
        InstrumentClass::HkStock,
    ];

    pub fn kind(&self) -> InstrumentKind {
        match self {
            InstrumentClass::UsOption => InstrumentKind::OptionContract,
            InstrumentClass::HkCbbc => InstrumentKind::WarrantCbbc,
            InstrumentClass::UsStock | InstrumentClass::HkStock => InstrumentKind::CashEquity,
        }
    }

    /// Shares represented by one traded unit
    pub fn multiplier(&self) -> Decimal {
        match self.kind() {
            InstrumentKind::OptionContract => Decimal::ONE_HUNDRED,
            InstrumentKind::WarrantCbbc | InstrumentKind::CashEquity => Decimal::ONE,
        }
    }

    pub fn fee_schedule(&self) -> FeeScheduleKind {
        match self {
            InstrumentClass::UsOption => FeeScheduleKind::PerContract,
            InstrumentClass::UsStock => FeeScheduleKind::PerShare,
            InstrumentClass::HkCbbc | InstrumentClass::HkStock => FeeScheduleKind::AdValorem,
        }
    }

    /// Options and CBBCs decay or get knocked out; they must be flat by the close.
    pub fn forbids_overnight(&self) -> bool {
        matches!(
            self.kind(),
            InstrumentKind::OptionContract | InstrumentKind::WarrantCbbc
        )
    }

    /// Units actually held for a display quantity
    pub fn actual_units(&self, quantity: u32) -> Decimal {
        Decimal::from(quantity) * self.multiplier()
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstrumentClass::UsOption => "US Option",
            InstrumentClass::HkCbbc => "HK CBBC",
            InstrumentClass::UsStock => "US Stock",
            InstrumentClass::HkStock => "HK Stock",
        }
    }
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognised instrument label
#[derive(Debug, Clone, Error)]
#[error("unknown instrument class: {0:?}")]
pub struct UnknownInstrument(pub String);

impl FromStr for InstrumentClass {
    type Err = UnknownInstrument;

    /// Accepts file labels, CLI slugs and legacy labels such as `美股期权 (US Option)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        InstrumentClass::ALL
            .into_iter()
            .find(|class| normalized.contains(&class.label().to_ascii_lowercase()))
            .ok_or_else(|| UnknownInstrument(s.to_string()))
    }
}
