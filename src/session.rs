//! Trading session
//!
//! Owns the ledger for the lifetime of one journal session and exposes the
//! operations the presentation layer calls. Discipline checks run here,
//! in front of the ledger's lifecycle transitions.

use crate::config::{Config, DisciplineConfig, FeeBasis};
use crate::data::{LedgerStore, StoreError};
use crate::economics::{
    plan_economics, plan_warnings, PlanEconomics, PlanWarning, TradePlan, ValidationError,
};
use crate::fees::FeeModel;
use crate::instrument::InstrumentClass;
use crate::ledger::{Execution, ExitOrder, Ledger, LedgerError, Position, PositionId};
use crate::risk::{
    DisciplineGuard, GuardReport, RiskError, RiskPctSizer, SizingSuggestion, Violation,
};
use crate::telemetry;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Current trading day
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a given time
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Risk(#[from] RiskError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Whether the error is a blocking discipline violation
    pub fn is_discipline_violation(&self) -> bool {
        matches!(self, SessionError::Risk(RiskError::DisciplineViolation(_)))
    }
}

/// A plan evaluated against today's ledger
#[derive(Debug, Clone, Serialize)]
pub struct PlanProposal {
    pub plan: TradePlan,
    pub economics: PlanEconomics,
    pub sizing: Option<SizingSuggestion>,
    pub warnings: Vec<PlanWarning>,
    /// Rule that would block opening, if any
    pub blocked_by: Option<Violation>,
}

impl PlanProposal {
    /// Error opening this plan fails with, if any
    ///
    /// Discipline rules come first, then a sizing that cannot fit one unit.
    pub fn blocking_error(&self) -> Option<RiskError> {
        if let Some(violation) = &self.blocked_by {
            return Some(RiskError::DisciplineViolation(violation.clone()));
        }
        self.sizing.as_ref().and_then(|s| s.quantity().err())
    }

    pub fn can_open(&self) -> bool {
        self.blocking_error().is_none()
    }
}

/// A journal session
pub struct Session {
    ledger: Ledger,
    fees: FeeModel,
    discipline: DisciplineConfig,
    guard: DisciplineGuard,
    sizer: Option<RiskPctSizer>,
    clock: Box<dyn Clock>,
}

impl Session {
    /// Start a session over `ledger` using the system clock
    pub fn new(ledger: Ledger, config: &Config) -> Self {
        Self {
            ledger,
            fees: FeeModel::from_config(&config.fees),
            discipline: config.discipline.clone(),
            guard: DisciplineGuard::from_config(&config.discipline),
            sizer: RiskPctSizer::from_config(&config.sizing),
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Start a session from a store
    pub fn load(store: &dyn LedgerStore, config: &Config) -> Result<Self, SessionError> {
        Ok(Self::new(store.load()?, config))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// End the session, handing back the ledger
    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    pub fn fee_model(&self) -> &FeeModel {
        &self.fees
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Compute the economics of a plan
    pub fn plan_economics(&self, plan: &TradePlan) -> Result<PlanEconomics, ValidationError> {
        plan_economics(plan, &self.fees)
    }

    /// Size a trade with the configured capital and risk percent
    pub fn suggest_quantity(
        &self,
        class: InstrumentClass,
        entry_price: Decimal,
        stop_price: Decimal,
    ) -> Result<SizingSuggestion, RiskError> {
        let sizer = self
            .sizer
            .as_ref()
            .ok_or(RiskError::InvalidSizingInput("no sizing capital configured"))?;
        sizer.suggest(entry_price, stop_price, class.multiplier())
    }

    /// Evaluate a plan: economics, warnings, and whether opening it is allowed today
    pub fn propose(&self, plan: &TradePlan) -> Result<PlanProposal, SessionError> {
        let economics = self.plan_economics(plan)?;
        let sizing = match &self.sizer {
            Some(sizer) => {
                Some(sizer.suggest(plan.entry_price, plan.stop_price, plan.class.multiplier())?)
            }
            None => None,
        };
        let warnings = plan_warnings(plan, &economics, &self.discipline, sizing.as_ref());

        let report = self.evaluate_guard(self.today());
        let blocked_by = match self.guard.check_open(&report, economics.principal) {
            Err(RiskError::DisciplineViolation(violation)) => Some(violation),
            Err(other) => return Err(other.into()),
            Ok(()) => None,
        };

        Ok(PlanProposal {
            plan: plan.clone(),
            economics,
            sizing,
            warnings,
            blocked_by,
        })
    }

    /// Validate a plan against the discipline rules and open it
    ///
    /// Refused whenever [`PlanProposal::can_open`] is false for the plan.
    pub fn open_position(&mut self, plan: &TradePlan) -> Result<Position, SessionError> {
        plan.validate_rationale(self.discipline.min_rationale_len)?;
        let proposal = self.propose(plan)?;
        if let Some(e) = proposal.blocking_error() {
            tracing::warn!(symbol = %plan.symbol, error = %e, "Opening rejected");
            return Err(e.into());
        }

        let position = self
            .ledger
            .open_position(plan, &self.fees, self.clock.now())?
            .clone();
        telemetry::record_position_opened(&position);
        Ok(position)
    }

    /// Exit part or all of a position
    pub fn apply_execution(
        &mut self,
        id: PositionId,
        order: ExitOrder,
    ) -> Result<Execution, SessionError> {
        let execution = self
            .ledger
            .apply_execution(id, order, &self.fees, self.fee_basis(), self.clock.now())?
            .clone();
        if let Some(position) = self.ledger.position(id) {
            telemetry::record_execution(&execution, position.class);
        }

        let report = self.evaluate_guard(execution.date);
        if report.is_locked {
            tracing::warn!(
                realized = %report.realized_pl_today,
                "Circuit breaker tripped: stop trading for the day"
            );
        } else if report.cooldown_advised {
            tracing::warn!(
                streak = report.consecutive_losses,
                "Losing streak: take a break before the next trade"
            );
        }
        Ok(execution)
    }

    /// Discipline state for a trading day
    pub fn evaluate_guard(&self, today: NaiveDate) -> GuardReport {
        let report = self.guard.evaluate(&self.ledger, today);
        telemetry::record_guard(&report, self.ledger.active_positions().count());
        report
    }

    /// Replace the ledger with the contents of a store
    ///
    /// The current ledger is kept if loading fails.
    pub fn import_from(&mut self, store: &dyn LedgerStore) -> Result<(), SessionError> {
        let ledger = store.load()?;
        tracing::info!(
            positions = ledger.len(),
            executions = ledger.executions().len(),
            "Ledger imported"
        );
        self.ledger = ledger;
        Ok(())
    }

    /// Write the ledger to a store
    pub fn export_to(&self, store: &dyn LedgerStore) -> Result<(), SessionError> {
        store.save(&self.ledger)?;
        tracing::info!(positions = self.ledger.len(), "Ledger exported");
        Ok(())
    }

    fn fee_basis(&self) -> FeeBasis {
        self.discipline.fee_basis
    }
}
