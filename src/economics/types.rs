//! Trade plan and economics types

use crate::instrument::InstrumentClass;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Declared trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short
    pub fn sign(&self) -> Decimal {
        match self {
            Direction::Long => Decimal::ONE,
            Direction::Short => Decimal::NEGATIVE_ONE,
        }
    }

    /// Whether `price` is on the losing side of `entry`
    pub fn is_loss_side(&self, entry: Decimal, price: Decimal) -> bool {
        match self {
            Direction::Long => price < entry,
            Direction::Short => price > entry,
        }
    }

    /// Whether `price` is on the winning side of `entry`
    pub fn is_profit_side(&self, entry: Decimal, price: Decimal) -> bool {
        match self {
            Direction::Long => price > entry,
            Direction::Short => price < entry,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => f.write_str("Long"),
            Direction::Short => f.write_str("Short"),
        }
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            other => Err(ValidationError::UnknownDirection(other.to_string())),
        }
    }
}

/// Largest price accepted on a plan, an exit or an imported record
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest money amount accepted on an imported record
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_701_131_776, 466_537_709, 54_210, false, 0);

/// Plan validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Symbol must not be empty")]
    EmptySymbol,
    #[error("{field} price must be positive, got {value}")]
    NonPositivePrice { field: &'static str, value: Decimal },
    #[error("{field} {value} is out of range (max {max})")]
    OutOfRange {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },
    #[error("Quantity must be at least 1")]
    ZeroQuantity,
    #[error("Stop {stop} is not on the loss side of entry {entry} for a {direction} trade")]
    StopOnWrongSide {
        direction: Direction,
        entry: Decimal,
        stop: Decimal,
    },
    #[error("Target {target} is not on the profit side of entry {entry} for a {direction} trade")]
    TargetOnWrongSide {
        direction: Direction,
        entry: Decimal,
        target: Decimal,
    },
    #[error("Entry rationale needs at least {min} characters, got {actual}")]
    RationaleTooShort { min: usize, actual: usize },
    #[error("Unknown direction: {0}")]
    UnknownDirection(String),
}

/// A planned trade as entered by the trader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub class: InstrumentClass,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub stop_price: Decimal,
    pub target_price: Decimal,
    pub target_price_2: Option<Decimal>,
    /// Display units: contracts, lots or shares
    pub quantity: u32,
    pub rationale: Option<String>,
}

impl TradePlan {
    /// Create a long plan with a single target
    pub fn long(
        class: InstrumentClass,
        symbol: impl Into<String>,
        entry_price: Decimal,
        stop_price: Decimal,
        target_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            class,
            symbol: symbol.into().trim().to_uppercase(),
            direction: Direction::Long,
            entry_price,
            stop_price,
            target_price,
            target_price_2: None,
            quantity,
            rationale: None,
        }
    }

    /// Flip the plan to a short
    pub fn short(mut self) -> Self {
        self.direction = Direction::Short;
        self
    }

    pub fn with_second_target(mut self, target: Decimal) -> Self {
        self.target_price_2 = Some(target);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Units actually held (quantity × multiplier)
    pub fn actual_units(&self) -> Decimal {
        self.class.actual_units(self.quantity)
    }

    /// Check prices, quantity and the stop/target sides
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let mut prices = vec![
            ("entry", self.entry_price),
            ("stop", self.stop_price),
            ("target", self.target_price),
        ];
        if let Some(target) = self.target_price_2 {
            prices.push(("second target", target));
        }
        if let Some((field, value)) = prices.iter().copied().find(|(_, p)| *p <= Decimal::ZERO) {
            return Err(ValidationError::NonPositivePrice { field, value });
        }
        if let Some((field, value)) = prices.into_iter().find(|(_, p)| *p > MAX_PRICE) {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                max: MAX_PRICE,
            });
        }

        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        if !self.direction.is_loss_side(self.entry_price, self.stop_price) {
            return Err(ValidationError::StopOnWrongSide {
                direction: self.direction,
                entry: self.entry_price,
                stop: self.stop_price,
            });
        }

        for target in std::iter::once(self.target_price).chain(self.target_price_2) {
            if !self.direction.is_profit_side(self.entry_price, target) {
                return Err(ValidationError::TargetOnWrongSide {
                    direction: self.direction,
                    entry: self.entry_price,
                    target,
                });
            }
        }

        Ok(())
    }

    /// Check the entry rationale against a minimum length (0 disables the check)
    pub fn validate_rationale(&self, min_len: usize) -> Result<(), ValidationError> {
        if min_len == 0 {
            return Ok(());
        }
        let actual = self
            .rationale
            .as_deref()
            .map(|r| r.trim().chars().count())
            .unwrap_or(0);
        if actual < min_len {
            return Err(ValidationError::RationaleTooShort {
                min: min_len,
                actual,
            });
        }
        Ok(())
    }
}

/// Projected outcome at a second target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetEconomics {
    pub target_price: Decimal,
    pub projected_profit: Decimal,
    pub risk_reward: Option<Decimal>,
}

/// Money amounts for a validated plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEconomics {
    pub actual_units: Decimal,
    /// Capital committed at entry
    pub principal: Decimal,
    /// Round-trip fee estimate
    pub fees: Decimal,
    /// Net loss if stopped out, fees included (positive amount)
    pub projected_loss: Decimal,
    /// Net profit at the primary target, fees deducted
    pub projected_profit: Decimal,
    /// `None` when not computable
    pub risk_reward: Option<Decimal>,
    pub second_target: Option<TargetEconomics>,
}

/// Realized result of exiting a slice of a position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExitSlice {
    pub units: Decimal,
    pub gross_pnl: Decimal,
    pub fees: Decimal,
    pub net_pnl: Decimal,
}

/// Non-blocking plan warnings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlanWarning {
    /// Risk/reward below the configured minimum
    LowRiskReward { risk_reward: Decimal, minimum: Decimal },
    /// Stop-out loss larger than the per-trade tolerance
    LossExceedsTolerance { projected_loss: Decimal, tolerance: Decimal },
    /// Quantity larger than the risk-based suggestion
    SizeAboveSuggestion { quantity: u32, suggested: u32 },
    /// Risk-based sizing cannot fit even one unit
    SizingInfeasible { allowed_loss: Decimal, per_unit_risk: Decimal },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::LowRiskReward {
                risk_reward,
                minimum,
            } => write!(
                f,
                "Risk/reward {:.2} is below {}; look for a better entry",
                risk_reward, minimum
            ),
            PlanWarning::LossExceedsTolerance {
                projected_loss,
                tolerance,
            } => write!(
                f,
                "A stop-out would lose {:.2}, above the {} per-trade tolerance",
                projected_loss, tolerance
            ),
            PlanWarning::SizeAboveSuggestion {
                quantity,
                suggested,
            } => write!(
                f,
                "Quantity {} exceeds the risk-based size of {}",
                quantity, suggested
            ),
            PlanWarning::SizingInfeasible {
                allowed_loss,
                per_unit_risk,
            } => write!(
                f,
                "One unit risks {:.2}, more than the {:.2} allowed",
                per_unit_risk, allowed_loss
            ),
        }
    }
}
