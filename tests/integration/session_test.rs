//! Integration tests for the trading session

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use trade_journal::config::{Config, FeeBasis, LossStreakPolicy};
use trade_journal::economics::{TradePlan, ValidationError};
use trade_journal::instrument::InstrumentClass;
use trade_journal::ledger::{ExitOrder, ExitReason, Ledger, LedgerError, PositionStatus};
use trade_journal::risk::{RiskError, Violation};
use trade_journal::session::{FixedClock, Session, SessionError};

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn session_at(ledger: Ledger, config: &Config, now: NaiveDateTime) -> Session {
    Session::new(ledger, config).with_clock(FixedClock(now))
}

fn option_plan(qty: u32) -> TradePlan {
    TradePlan::long(
        InstrumentClass::UsOption,
        "NVDA",
        dec!(1.00),
        dec!(0.80),
        dec!(1.50),
        qty,
    )
}

fn stock_plan() -> TradePlan {
    TradePlan::long(
        InstrumentClass::UsStock,
        "AAPL",
        dec!(200),
        dec!(190),
        dec!(230),
        100,
    )
}

#[test]
fn test_plan_economics_single_contract() {
    let session = session_at(Ledger::new(), &Config::default(), at(16, 9, 30));
    let economics = session.plan_economics(&option_plan(1)).unwrap();

    assert_eq!(economics.actual_units, dec!(100));
    assert_eq!(economics.principal, dec!(100));
    assert_eq!(economics.fees, dec!(4.00));
    assert_eq!(economics.projected_loss, dec!(24.00));
    assert_eq!(economics.projected_profit, dec!(46.00));
    assert_eq!(economics.risk_reward.unwrap().round_dp(2), dec!(1.92));
}

#[test]
fn test_scale_out_in_two_slices() {
    let mut session = session_at(Ledger::new(), &Config::default(), at(16, 9, 30));
    let id = session.open_position(&option_plan(10)).unwrap().id;

    // 5 contracts: max(2.00, 5 x 0.80) x 2 = 8 per slice
    let first = session
        .apply_execution(id, ExitOrder::new(dec!(1.40), 5))
        .unwrap();
    assert_eq!(first.fees, dec!(8));
    assert_eq!(first.net_pnl, dec!(192));
    let position = session.ledger().position(id).unwrap();
    assert_eq!(position.status, PositionStatus::HalfClosed);
    assert_eq!(position.remaining_quantity, 5);

    let second = session
        .apply_execution(id, ExitOrder::new(dec!(1.60), 5))
        .unwrap();
    assert_eq!(second.net_pnl, dec!(292));

    let position = session.ledger().position(id).unwrap();
    assert_eq!(position.status, PositionStatus::Closed);
    assert_eq!(position.remaining_quantity, 0);
    assert_eq!(position.realized_pnl, first.net_pnl + second.net_pnl);
    assert_eq!(position.average_exit_price, dec!(1.5));

    // the first slice is never revisited
    assert_eq!(session.ledger().executions()[0], first);
}

#[test]
fn test_exit_on_closed_position_rejected() {
    let mut session = session_at(Ledger::new(), &Config::default(), at(16, 9, 30));
    let id = session.open_position(&option_plan(2)).unwrap().id;
    session
        .apply_execution(id, ExitOrder::new(dec!(1.20), 2))
        .unwrap();

    let result = session.apply_execution(id, ExitOrder::new(dec!(1.20), 1));
    assert!(matches!(
        result,
        Err(SessionError::Ledger(LedgerError::InvalidQuantity {
            requested: 1,
            remaining: 0
        }))
    ));
    assert_eq!(session.ledger().executions().len(), 1);
}

#[test]
fn test_fee_basis_configurations() {
    let mut slice_session = session_at(Ledger::new(), &Config::default(), at(16, 9, 30));
    let mut config = Config::default();
    config.discipline.fee_basis = FeeBasis::Position;
    let mut position_session = session_at(Ledger::new(), &config, at(16, 9, 30));

    for session in [&mut slice_session, &mut position_session] {
        let id = session.open_position(&option_plan(3)).unwrap().id;
        session
            .apply_execution(id, ExitOrder::new(dec!(1.50), 1))
            .unwrap();
        session
            .apply_execution(id, ExitOrder::new(dec!(1.50), 2))
            .unwrap();
    }

    // each slice pays its own floor: 4 + 4
    let slice = &slice_session.ledger().positions()[0];
    assert_eq!(slice.fees_charged, dec!(8));

    // the planned 4.80 round trip is spread 1.60 + 3.20
    let spread = &position_session.ledger().positions()[0];
    assert_eq!(spread.fees, dec!(4.80));
    assert_eq!(spread.fees_charged, dec!(4.80));
    let fees: Vec<_> = position_session
        .ledger()
        .executions()
        .iter()
        .map(|e| e.fees)
        .collect();
    assert_eq!(fees, vec![dec!(1.60), dec!(3.20)]);
}

#[test]
fn test_daily_loss_limit_blocks_open() {
    let config = Config::default();
    let mut session = session_at(Ledger::new(), &config, at(16, 10, 0));
    let id = session.open_position(&stock_plan()).unwrap().id;

    // (175.04 - 200) x 100 - 4 = -2500
    let execution = session
        .apply_execution(id, ExitOrder::new(dec!(175.04), 100))
        .unwrap();
    assert_eq!(execution.net_pnl, dec!(-2500));
    assert_eq!(execution.reason, ExitReason::StopTriggered);

    let report = session.evaluate_guard(session.today());
    assert!(report.is_locked);
    assert_eq!(report.realized_pl_today, dec!(-2500));

    let before = session.ledger().len();
    let err = session.open_position(&option_plan(1)).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Risk(RiskError::DisciplineViolation(Violation::DailyLossLimit { .. }))
    ));
    assert_eq!(session.ledger().len(), before);

    let proposal = session.propose(&option_plan(1)).unwrap();
    assert!(!proposal.can_open());
}

#[test]
fn test_lock_lifts_next_day() {
    let config = Config::default();
    let mut session = session_at(Ledger::new(), &config, at(16, 10, 0));
    let id = session.open_position(&stock_plan()).unwrap().id;
    session
        .apply_execution(id, ExitOrder::new(dec!(175.04), 100))
        .unwrap();
    assert!(session.open_position(&option_plan(1)).is_err());

    let mut tomorrow = session_at(session.into_ledger(), &config, at(17, 9, 30));
    let report = tomorrow.evaluate_guard(tomorrow.today());
    assert!(!report.is_locked);
    assert_eq!(report.realized_pl_today, dec!(0));
    assert!(tomorrow.open_position(&option_plan(1)).is_ok());
    assert_eq!(tomorrow.ledger().len(), 2);
}

#[test]
fn test_losing_streak_advises_cooldown_without_blocking() {
    let config = Config::default();
    let mut session = session_at(Ledger::new(), &config, at(16, 10, 0));

    for _ in 0..3 {
        let id = session.open_position(&option_plan(1)).unwrap().id;
        session
            .apply_execution(id, ExitOrder::new(dec!(0.90), 1))
            .unwrap();
    }

    let report = session.evaluate_guard(session.today());
    assert_eq!(report.consecutive_losses, 3);
    assert_eq!(report.losing_executions_today, 3);
    assert!(report.cooldown_advised);
    assert!(!report.is_locked);
    assert!(session.open_position(&option_plan(1)).is_ok());
}

#[test]
fn test_stop_only_streak_policy() {
    let mut config = Config::default();
    config.discipline.loss_streak = LossStreakPolicy::StopOnly;
    let mut session = session_at(Ledger::new(), &config, at(16, 10, 0));

    let a = session.open_position(&option_plan(1)).unwrap().id;
    session
        .apply_execution(a, ExitOrder::new(dec!(0.80), 1))
        .unwrap();
    // manual loss above the stop breaks the streak under this policy
    let b = session.open_position(&option_plan(1)).unwrap().id;
    session
        .apply_execution(b, ExitOrder::new(dec!(0.95), 1))
        .unwrap();

    let report = session.evaluate_guard(session.today());
    assert_eq!(report.losing_executions_today, 2);
    assert_eq!(report.consecutive_losses, 0);
}

#[test]
fn test_overnight_violation_reported() {
    let config = Config::default();
    let mut session = session_at(Ledger::new(), &config, at(16, 10, 0));
    session.open_position(&option_plan(2)).unwrap();
    session.open_position(&stock_plan()).unwrap();

    let next = session_at(session.into_ledger(), &config, at(17, 9, 30));
    let report = next.evaluate_guard(next.today());
    assert_eq!(report.overnight_violations.len(), 1);
    assert_eq!(report.overnight_violations[0].symbol, "NVDA");
    assert_eq!(report.overnight_violations[0].opened_on, at(16, 0, 0).date());
}

#[test]
fn test_invalid_plan_not_recorded() {
    let mut session = session_at(Ledger::new(), &Config::default(), at(16, 10, 0));
    let plan = TradePlan::long(
        InstrumentClass::UsOption,
        "NVDA",
        dec!(1.00),
        dec!(1.10),
        dec!(1.50),
        1,
    );

    let result = session.open_position(&plan);
    assert!(matches!(
        result,
        Err(SessionError::Validation(
            ValidationError::StopOnWrongSide { .. }
        ))
    ));
    assert!(session.ledger().is_empty());
}

#[test]
fn test_infeasible_sizing_blocks_open() {
    let mut config = Config::default();
    config.sizing.capital = Some(dec!(1000));
    config.sizing.risk_pct = dec!(1);
    let mut session = session_at(Ledger::new(), &config, at(16, 10, 0));

    // allowed loss 10, one contract 0.20 x 100 = 20
    let proposal = session.propose(&option_plan(1)).unwrap();
    assert!(!proposal.can_open());

    let result = session.open_position(&option_plan(1));
    assert!(matches!(
        result,
        Err(SessionError::Risk(RiskError::InfeasibleSizing { allowed_loss, per_unit_risk }))
            if allowed_loss == dec!(10) && per_unit_risk == dec!(20)
    ));
    assert!(session.ledger().is_empty());

    // a tighter stop fits one contract
    let mut tight = option_plan(1);
    tight.stop_price = dec!(0.95);
    assert!(session.open_position(&tight).is_ok());
}

#[test]
fn test_oversized_plan_rejected() {
    let mut session = session_at(Ledger::new(), &Config::default(), at(16, 10, 0));
    let plan = TradePlan::long(
        InstrumentClass::UsOption,
        "X",
        dec!(1000000000000000000000),
        dec!(1),
        dec!(2000000000000000000000),
        4_000_000_000,
    );

    assert!(matches!(
        session.propose(&plan),
        Err(SessionError::Validation(ValidationError::OutOfRange { .. }))
    ));
    assert!(session.open_position(&plan).is_err());
    assert!(session.ledger().is_empty());
}
