//! Risk management types

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Discipline rule that blocks a new position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Violation {
    /// Today's realized loss reached the daily limit
    DailyLossLimit { realized: Decimal, limit: Decimal },
    /// Principal above the per-trade cap
    PerTradeCap { principal: Decimal, cap: Decimal },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DailyLossLimit { realized, limit } => write!(
                f,
                "realized {} today reached the -{} daily limit; trading locked",
                realized, limit
            ),
            Violation::PerTradeCap { principal, cap } => {
                write!(f, "principal {} exceeds the {} per-trade cap", principal, cap)
            }
        }
    }
}

/// Risk management errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// No size of one unit or more fits within the allowed loss
    #[error("Sizing infeasible: one unit risks {per_unit_risk}, allowed loss is {allowed_loss}")]
    InfeasibleSizing {
        allowed_loss: Decimal,
        per_unit_risk: Decimal,
    },
    /// Sizing inputs that cannot produce a size
    #[error("Invalid sizing input: {0}")]
    InvalidSizingInput(&'static str),
    /// Opening blocked by a discipline rule
    #[error("Discipline violation: {0}")]
    DisciplineViolation(Violation),
}
