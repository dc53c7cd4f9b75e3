//! Trade economics calculator
//!
//! Converts plan parameters into money amounts. Both the pre-trade
//! projection and the realized result of an exit go through
//! [`net_pnl`], so a plan's projected profit equals the realized P&L of
//! exiting the full position at its target.

use super::types::{
    Direction, ExitSlice, PlanEconomics, PlanWarning, TargetEconomics, TradePlan, ValidationError,
};
use crate::config::DisciplineConfig;
use crate::fees::FeeModel;
use crate::risk::SizingSuggestion;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Net P&L of moving `units` from `entry` to `exit`, after `fees`
pub fn net_pnl(
    direction: Direction,
    entry: Decimal,
    exit: Decimal,
    units: Decimal,
    fees: Decimal,
) -> Decimal {
    (exit - entry) * units * direction.sign() - fees
}

fn risk_reward(profit: Decimal, loss: Decimal) -> Option<Decimal> {
    if loss > Decimal::ZERO {
        profit.checked_div(loss)
    } else {
        None
    }
}

/// Compute principal, fees, projected loss/profit and R:R for a plan
///
/// Rejects plans that fail [`TradePlan::validate`]; a stop on the wrong side
/// of entry never produces a zero or negative projected loss.
pub fn plan_economics(plan: &TradePlan, fees: &FeeModel) -> Result<PlanEconomics, ValidationError> {
    plan.validate()?;

    let actual_units = plan.actual_units();
    let principal = plan.entry_price * actual_units;
    let fee = fees.estimate_fee(plan.class, plan.quantity, principal);

    let projected_loss = -net_pnl(
        plan.direction,
        plan.entry_price,
        plan.stop_price,
        actual_units,
        fee,
    );
    let projected_profit = net_pnl(
        plan.direction,
        plan.entry_price,
        plan.target_price,
        actual_units,
        fee,
    );

    let second_target = plan.target_price_2.map(|target| {
        let profit = net_pnl(plan.direction, plan.entry_price, target, actual_units, fee);
        TargetEconomics {
            target_price: target,
            projected_profit: profit,
            risk_reward: risk_reward(profit, projected_loss),
        }
    });

    Ok(PlanEconomics {
        actual_units,
        principal,
        fees: fee,
        projected_loss,
        projected_profit,
        risk_reward: risk_reward(projected_profit, projected_loss),
        second_target,
    })
}

/// Realized result of exiting `units` at `exit_price` with `fees` charged on the slice
pub fn exit_slice(
    direction: Direction,
    entry_price: Decimal,
    exit_price: Decimal,
    units: Decimal,
    fees: Decimal,
) -> ExitSlice {
    let gross_pnl = net_pnl(direction, entry_price, exit_price, units, Decimal::ZERO);
    ExitSlice {
        units,
        gross_pnl,
        fees,
        net_pnl: gross_pnl - fees,
    }
}

/// Stop placed `pct` percent against the trade from entry
///
/// Saturates instead of overflowing; plan validation rejects the result.
pub fn suggest_stop(direction: Direction, entry: Decimal, pct: Decimal) -> Decimal {
    let offset = entry.saturating_mul(pct) / dec!(100);
    match direction {
        Direction::Long => entry.saturating_sub(offset),
        Direction::Short => entry.saturating_add(offset),
    }
}

/// Default target: 1.5× entry for a long, half the entry for a short
pub fn default_target(direction: Direction, entry: Decimal) -> Decimal {
    match direction {
        Direction::Long => entry.saturating_mul(dec!(1.5)),
        Direction::Short => entry * dec!(0.5),
    }
}

/// Collect non-blocking warnings for a computed plan
pub fn plan_warnings(
    plan: &TradePlan,
    economics: &PlanEconomics,
    discipline: &DisciplineConfig,
    sizing: Option<&SizingSuggestion>,
) -> Vec<PlanWarning> {
    let mut warnings = vec![];

    if let Some(rr) = economics.risk_reward {
        if rr < discipline.min_risk_reward {
            warnings.push(PlanWarning::LowRiskReward {
                risk_reward: rr,
                minimum: discipline.min_risk_reward,
            });
        }
    }

    if let Some(tolerance) = discipline.max_loss_per_trade {
        if economics.projected_loss > tolerance {
            warnings.push(PlanWarning::LossExceedsTolerance {
                projected_loss: economics.projected_loss,
                tolerance,
            });
        }
    }

    match sizing {
        Some(SizingSuggestion::Fits { quantity, .. }) if plan.quantity > *quantity => {
            warnings.push(PlanWarning::SizeAboveSuggestion {
                quantity: plan.quantity,
                suggested: *quantity,
            });
        }
        Some(SizingSuggestion::Infeasible {
            allowed_loss,
            per_unit_risk,
        }) => {
            warnings.push(PlanWarning::SizingInfeasible {
                allowed_loss: *allowed_loss,
                per_unit_risk: *per_unit_risk,
            });
        }
        _ => {}
    }

    warnings
}
