//! Position sizing by risk percentage
//!
//! Sizes a trade so that a stop-out loses at most a fixed share of capital.
//! Rounding is always down.

use super::RiskError;
use crate::config::SizingConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Outcome of a sizing request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SizingSuggestion {
    /// Largest quantity whose stop-out loss stays within the allowed loss
    Fits {
        quantity: u32,
        allowed_loss: Decimal,
        per_unit_risk: Decimal,
    },
    /// Even one unit would exceed the allowed loss
    Infeasible {
        allowed_loss: Decimal,
        per_unit_risk: Decimal,
    },
}

impl SizingSuggestion {
    /// Suggested quantity, or `InfeasibleSizing`
    pub fn quantity(&self) -> Result<u32, RiskError> {
        match self {
            SizingSuggestion::Fits { quantity, .. } => Ok(*quantity),
            SizingSuggestion::Infeasible {
                allowed_loss,
                per_unit_risk,
            } => Err(RiskError::InfeasibleSizing {
                allowed_loss: *allowed_loss,
                per_unit_risk: *per_unit_risk,
            }),
        }
    }
}

/// Risk-percentage position sizer
#[derive(Debug, Clone)]
pub struct RiskPctSizer {
    /// Account capital
    pub capital: Decimal,
    /// Percent of capital risked per trade (1.0 = 1%)
    pub risk_pct: Decimal,
}

impl RiskPctSizer {
    /// Create a new sizer
    pub fn new(capital: Decimal, risk_pct: Decimal) -> Self {
        Self { capital, risk_pct }
    }

    /// Create from SizingConfig; `None` when no capital is configured
    pub fn from_config(config: &SizingConfig) -> Option<Self> {
        config
            .capital
            .map(|capital| Self::new(capital, config.risk_pct))
    }

    /// Maximum loss allowed on one trade; `None` on overflow
    pub fn allowed_loss(&self) -> Option<Decimal> {
        self.capital
            .checked_mul(self.risk_pct)
            .map(|amount| amount / dec!(100))
    }

    /// Size a trade from its entry, stop and contract multiplier
    pub fn suggest(
        &self,
        entry_price: Decimal,
        stop_price: Decimal,
        multiplier: Decimal,
    ) -> Result<SizingSuggestion, RiskError> {
        if self.capital <= Decimal::ZERO {
            return Err(RiskError::InvalidSizingInput("capital must be positive"));
        }
        if self.risk_pct <= Decimal::ZERO {
            return Err(RiskError::InvalidSizingInput("risk percent must be positive"));
        }
        if multiplier <= Decimal::ZERO {
            return Err(RiskError::InvalidSizingInput("multiplier must be positive"));
        }

        let out_of_range = RiskError::InvalidSizingInput("amount out of range");
        let allowed_loss = self.allowed_loss().ok_or(out_of_range.clone())?;
        let per_unit_risk = entry_price
            .checked_sub(stop_price)
            .and_then(|distance| distance.abs().checked_mul(multiplier))
            .ok_or(out_of_range)?;
        if per_unit_risk.is_zero() {
            return Err(RiskError::InvalidSizingInput("entry and stop must differ"));
        }

        if per_unit_risk > allowed_loss {
            return Ok(SizingSuggestion::Infeasible {
                allowed_loss,
                per_unit_risk,
            });
        }

        let quantity = (allowed_loss / per_unit_risk)
            .floor()
            .to_u32()
            .unwrap_or(u32::MAX);

        Ok(SizingSuggestion::Fits {
            quantity,
            allowed_loss,
            per_unit_risk,
        })
    }
}

/// Maximum quantity that keeps a stop-out within `risk_pct` percent of `capital`
pub fn suggest_quantity(
    capital: Decimal,
    risk_pct: Decimal,
    entry_price: Decimal,
    stop_price: Decimal,
    multiplier: Decimal,
) -> Result<u32, RiskError> {
    RiskPctSizer::new(capital, risk_pct)
        .suggest(entry_price, stop_price, multiplier)?
        .quantity()
}
