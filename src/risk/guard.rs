//! Discipline guard
//!
//! Daily loss circuit-breaker, losing-streak counter and overnight checks.
//! Holds no state: every report is recomputed from the ledger.

use super::{RiskError, Violation};
use crate::config::{DisciplineConfig, LossStreakPolicy};
use crate::instrument::InstrumentClass;
use crate::ledger::{Execution, ExitReason, Ledger, PositionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// An active position in an instrument that must not be held overnight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvernightViolation {
    pub position_id: PositionId,
    pub symbol: String,
    pub class: InstrumentClass,
    pub opened_on: NaiveDate,
    pub remaining_quantity: u32,
}

/// Discipline state for one trading day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardReport {
    pub date: NaiveDate,
    /// Sum of execution net P&L on the day
    pub realized_pl_today: Decimal,
    /// Executions on the day with negative net P&L
    pub losing_executions_today: usize,
    /// Current losing streak, most recent execution backwards
    pub consecutive_losses: u32,
    /// Streak has reached the configured limit
    pub cooldown_advised: bool,
    /// Circuit-breaker: new positions are blocked for the day
    pub is_locked: bool,
    pub daily_loss_limit: Decimal,
    pub positions_opened_today: usize,
    pub overnight_violations: Vec<OvernightViolation>,
}

/// Evaluates discipline rules against the ledger
#[derive(Debug, Clone)]
pub struct DisciplineGuard {
    /// Positive amount of realized loss that locks the day
    pub daily_loss_limit: Decimal,
    pub consecutive_loss_limit: u32,
    pub max_principal_per_trade: Option<Decimal>,
    pub loss_streak: LossStreakPolicy,
}

impl DisciplineGuard {
    /// Create from DisciplineConfig
    pub fn from_config(config: &DisciplineConfig) -> Self {
        Self {
            daily_loss_limit: config.daily_loss_limit,
            consecutive_loss_limit: config.consecutive_loss_limit,
            max_principal_per_trade: config.max_principal_per_trade,
            loss_streak: config.loss_streak,
        }
    }

    /// Evaluate the ledger for `today`
    pub fn evaluate(&self, ledger: &Ledger, today: NaiveDate) -> GuardReport {
        let executions: Vec<&Execution> = ledger.executions_on(today).collect();

        let realized_pl_today: Decimal = executions.iter().map(|e| e.net_pnl).sum();
        let losing_executions_today = executions.iter().filter(|e| e.is_loss()).count();
        let consecutive_losses = consecutive_losses(&executions, self.loss_streak);
        let is_locked = realized_pl_today <= -self.daily_loss_limit;

        let overnight_violations = ledger
            .active_positions()
            .filter(|p| p.violates_overnight())
            .map(|p| OvernightViolation {
                position_id: p.id,
                symbol: p.symbol.clone(),
                class: p.class,
                opened_on: p.opened_on,
                remaining_quantity: p.remaining_quantity,
            })
            .collect();

        if is_locked {
            tracing::warn!(
                date = %today,
                realized = %realized_pl_today,
                limit = %self.daily_loss_limit,
                "Daily loss limit reached, trading locked"
            );
        }

        GuardReport {
            date: today,
            realized_pl_today,
            losing_executions_today,
            consecutive_losses,
            cooldown_advised: self.consecutive_loss_limit > 0
                && consecutive_losses >= self.consecutive_loss_limit,
            is_locked,
            daily_loss_limit: self.daily_loss_limit,
            positions_opened_today: ledger.positions_opened_on(today).count(),
            overnight_violations,
        }
    }

    /// Check whether a new position with `principal` may be opened
    pub fn check_open(&self, report: &GuardReport, principal: Decimal) -> Result<(), RiskError> {
        if report.is_locked {
            return Err(RiskError::DisciplineViolation(Violation::DailyLossLimit {
                realized: report.realized_pl_today,
                limit: self.daily_loss_limit,
            }));
        }

        if let Some(cap) = self.max_principal_per_trade {
            if per_trade_cap_check(principal, cap) {
                return Err(RiskError::DisciplineViolation(Violation::PerTradeCap {
                    principal,
                    cap,
                }));
            }
        }

        Ok(())
    }
}

/// True when `principal` exceeds the per-trade cap
pub fn per_trade_cap_check(principal: Decimal, cap: Decimal) -> bool {
    principal > cap
}

/// Length of the losing streak at the end of a chronological execution list
pub fn consecutive_losses(executions: &[&Execution], policy: LossStreakPolicy) -> u32 {
    let extends = |e: &Execution| match policy {
        LossStreakPolicy::AnyExit => e.is_loss(),
        LossStreakPolicy::StopOnly => e.is_loss() && e.reason == ExitReason::StopTriggered,
    };

    executions
        .iter()
        .rev()
        .take_while(|e| extends(e))
        .count() as u32
}
