//! Position lifecycle transitions
//!
//! `open_position` and `apply_execution` are the only writers of position
//! state. Open → Half-Closed → Closed; an exit of the full remaining
//! quantity goes straight to Closed.

use super::{
    Execution, ExitOrder, ExitReason, Ledger, LedgerError, Position, PositionId, PositionStatus,
};
use crate::config::FeeBasis;
use crate::economics::{exit_slice, plan_economics, TradePlan, ValidationError, MAX_PRICE};
use crate::fees::FeeModel;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

impl Ledger {
    /// Validate a plan and record it as a new open position
    pub fn open_position(
        &mut self,
        plan: &TradePlan,
        fees: &FeeModel,
        now: NaiveDateTime,
    ) -> Result<&Position, LedgerError> {
        let economics = plan_economics(plan, fees)?;

        let position = Position {
            id: PositionId::from_time(now),
            opened_on: now.date(),
            class: plan.class,
            symbol: plan.symbol.clone(),
            direction: plan.direction,
            entry_price: plan.entry_price,
            quantity: plan.quantity,
            remaining_quantity: plan.quantity,
            actual_units: economics.actual_units,
            stop_price: plan.stop_price,
            target_price: plan.target_price,
            target_price_2: plan.target_price_2,
            principal: economics.principal,
            fees: economics.fees,
            fees_charged: Decimal::ZERO,
            average_exit_price: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            status: PositionStatus::Open,
            rationale: plan.rationale.clone().unwrap_or_default(),
        };

        tracing::info!(
            id = %position.id,
            symbol = %position.symbol,
            class = %position.class,
            quantity = position.quantity,
            principal = %position.principal,
            "Position opened"
        );

        let index = self.positions.len();
        self.positions.push(position);
        Ok(&self.positions[index])
    }

    /// Exit part or all of a position
    ///
    /// Fee and P&L of the slice are fixed here and never revisited. On error
    /// the ledger is unchanged.
    pub fn apply_execution(
        &mut self,
        id: PositionId,
        order: ExitOrder,
        fees: &FeeModel,
        basis: FeeBasis,
        now: NaiveDateTime,
    ) -> Result<&Execution, LedgerError> {
        let ExitOrder {
            price: exit_price,
            quantity: exit_qty,
            reason,
        } = order;
        let position = self
            .positions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LedgerError::UnknownPosition(id))?;

        if exit_qty == 0 || exit_qty > position.remaining_quantity {
            return Err(LedgerError::InvalidQuantity {
                requested: exit_qty,
                remaining: position.remaining_quantity,
            });
        }
        if exit_price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice {
                field: "exit",
                value: exit_price,
            }
            .into());
        }
        if exit_price > MAX_PRICE {
            return Err(ValidationError::OutOfRange {
                field: "exit",
                value: exit_price,
                max: MAX_PRICE,
            }
            .into());
        }

        let slice_fee = slice_fee(position, exit_qty, fees, basis);
        let units = position.class.actual_units(exit_qty);
        let slice = exit_slice(
            position.direction,
            position.entry_price,
            exit_price,
            units,
            slice_fee,
        );
        let reason = reason.unwrap_or_else(|| ExitReason::infer(position, exit_price));

        let exited_before = Decimal::from(position.exited_quantity());
        let exited_after = exited_before + Decimal::from(exit_qty);
        position.average_exit_price = ((position.average_exit_price * exited_before
            + exit_price * Decimal::from(exit_qty))
            / exited_after)
            .round_dp(6);
        position.remaining_quantity -= exit_qty;
        position.realized_pnl += slice.net_pnl;
        position.fees_charged += slice.fees;
        position.status =
            PositionStatus::for_quantities(position.quantity, position.remaining_quantity);

        tracing::info!(
            id = %id,
            symbol = %position.symbol,
            exit_price = %exit_price,
            quantity = exit_qty,
            net_pnl = %slice.net_pnl,
            status = %position.status,
            reason = %reason,
            "Execution applied"
        );

        let index = self.executions.len();
        self.executions.push(Execution {
            position_id: id,
            date: now.date(),
            executed_at: now,
            exit_price,
            quantity: exit_qty,
            net_pnl: slice.net_pnl,
            fees: slice.fees,
            reason,
        });
        Ok(&self.executions[index])
    }
}

/// Fee charged on an exit slice
fn slice_fee(position: &Position, exit_qty: u32, fees: &FeeModel, basis: FeeBasis) -> Decimal {
    match basis {
        FeeBasis::Slice => {
            let notional = position.entry_price * position.class.actual_units(exit_qty);
            fees.estimate_fee(position.class, exit_qty, notional)
        }
        FeeBasis::Position if exit_qty == position.remaining_quantity => {
            (position.fees - position.fees_charged).max(Decimal::ZERO)
        }
        FeeBasis::Position => {
            (position.fees * Decimal::from(exit_qty) / Decimal::from(position.quantity)).round_dp(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::InstrumentClass;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn ten_contract_plan() -> TradePlan {
        TradePlan::long(
            InstrumentClass::UsOption,
            "NVDA",
            dec!(1.00),
            dec!(0.80),
            dec!(1.50),
            10,
        )
        .with_rationale("Reclaim of VWAP")
    }

    fn open_ten(ledger: &mut Ledger) -> PositionId {
        ledger
            .open_position(&ten_contract_plan(), &FeeModel::default(), at(9, 35))
            .unwrap()
            .id
    }

    #[test]
    fn test_open_position_initial_state() {
        let mut ledger = Ledger::new();
        let position = ledger
            .open_position(&ten_contract_plan(), &FeeModel::default(), at(9, 35))
            .unwrap()
            .clone();

        assert_eq!(position.status, PositionStatus::Open);
        assert_eq!(position.quantity, 10);
        assert_eq!(position.remaining_quantity, 10);
        assert_eq!(position.actual_units, dec!(1000));
        assert_eq!(position.principal, dec!(1000));
        // 2 × max(2, 10 × 0.8)
        assert_eq!(position.fees, dec!(16));
        assert_eq!(position.opened_on, at(9, 35).date());
        assert_eq!(position.rationale, "Reclaim of VWAP");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_open_position_rejects_invalid_plan() {
        let mut ledger = Ledger::new();
        let mut plan = ten_contract_plan();
        plan.stop_price = dec!(1.20);

        let result = ledger.open_position(&plan, &FeeModel::default(), at(9, 35));
        assert!(matches!(
            result,
            Err(LedgerError::Validation(ValidationError::StopOnWrongSide { .. }))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_two_step_scale_out() {
        let mut ledger = Ledger::new();
        let fees = FeeModel::default();
        let id = open_ten(&mut ledger);

        let first = ledger
            .apply_execution(id, ExitOrder::new(dec!(1.40), 5), &fees, FeeBasis::Slice, at(10, 0))
            .unwrap()
            .clone();
        // (1.40 - 1.00) * 500 - 2 × max(2, 5 × 0.8)
        assert_eq!(first.fees, dec!(8));
        assert_eq!(first.net_pnl, dec!(192));
        assert_eq!(first.reason, ExitReason::Manual);

        let position = ledger.position(id).unwrap();
        assert_eq!(position.status, PositionStatus::HalfClosed);
        assert_eq!(position.remaining_quantity, 5);

        let second = ledger
            .apply_execution(id, ExitOrder::new(dec!(1.60), 5), &fees, FeeBasis::Slice, at(10, 30))
            .unwrap()
            .clone();
        // (1.60 - 1.00) * 500 - 8
        assert_eq!(second.net_pnl, dec!(292));
        assert_eq!(second.reason, ExitReason::TargetTriggered);

        let position = ledger.position(id).unwrap();
        assert_eq!(position.status, PositionStatus::Closed);
        assert_eq!(position.remaining_quantity, 0);
        assert_eq!(position.realized_pnl, first.net_pnl + second.net_pnl);
        assert_eq!(position.fees_charged, dec!(16));
        assert_eq!(position.average_exit_price, dec!(1.50));

        // earlier slice untouched by the later one
        assert_eq!(ledger.executions()[0], first);
    }

    #[test]
    fn test_full_exit_goes_straight_to_closed() {
        let mut ledger = Ledger::new();
        let id = open_ten(&mut ledger);

        let execution = ledger
            .apply_execution(
                id,
                ExitOrder::new(dec!(0.80), 10),
                &FeeModel::default(),
                FeeBasis::Slice,
                at(9, 50),
            )
            .unwrap()
            .clone();

        assert_eq!(execution.reason, ExitReason::StopTriggered);
        // (0.80 - 1.00) * 1000 - 16
        assert_eq!(execution.net_pnl, dec!(-216));
        assert_eq!(
            ledger.position(id).unwrap().status,
            PositionStatus::Closed
        );
    }

    #[test]
    fn test_invalid_quantity_leaves_ledger_unchanged() {
        let mut ledger = Ledger::new();
        let fees = FeeModel::default();
        let id = open_ten(&mut ledger);
        let before = ledger.clone();

        for qty in [0, 11] {
            let result =
                ledger.apply_execution(id, ExitOrder::new(dec!(1.2), qty), &fees, FeeBasis::Slice, at(10, 0));
            assert_eq!(
                result.unwrap_err(),
                LedgerError::InvalidQuantity {
                    requested: qty,
                    remaining: 10
                }
            );
        }
        assert_eq!(ledger, before);

        ledger
            .apply_execution(id, ExitOrder::new(dec!(1.2), 10), &fees, FeeBasis::Slice, at(10, 0))
            .unwrap();
        let closed = ledger.clone();
        let result =
            ledger.apply_execution(id, ExitOrder::new(dec!(1.2), 1), &fees, FeeBasis::Slice, at(10, 5));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidQuantity { remaining: 0, .. })
        ));
        assert_eq!(ledger, closed);
    }

    #[test]
    fn test_unknown_position_and_bad_price() {
        let mut ledger = Ledger::new();
        let fees = FeeModel::default();
        let id = open_ten(&mut ledger);
        let stranger = PositionId::from_time(at(9, 0));

        assert_eq!(
            ledger
                .apply_execution(stranger, ExitOrder::new(dec!(1), 1), &fees, FeeBasis::Slice, at(10, 0))
                .unwrap_err(),
            LedgerError::UnknownPosition(stranger)
        );
        assert!(matches!(
            ledger.apply_execution(id, ExitOrder::new(dec!(0), 1), &fees, FeeBasis::Slice, at(10, 0)),
            Err(LedgerError::Validation(ValidationError::NonPositivePrice { field: "exit", .. }))
        ));
        assert!(matches!(
            ledger.apply_execution(id, ExitOrder::new(dec!(100000000000000000000), 1), &fees, FeeBasis::Slice, at(10, 0)),
            Err(LedgerError::Validation(ValidationError::OutOfRange { field: "exit", .. }))
        ));
        assert!(ledger.executions().is_empty());
    }

    #[test]
    fn test_quantity_conservation_and_monotonic_status() {
        let mut ledger = Ledger::new();
        let fees = FeeModel::default();
        let id = open_ten(&mut ledger);
        let mut seen_closed = false;

        for (step, qty) in [1u32, 3, 2, 4].into_iter().enumerate() {
            ledger
                .apply_execution(
                    id,
                    ExitOrder::new(dec!(1.10), qty).with_reason(ExitReason::Manual),
                    &fees,
                    FeeBasis::Slice,
                    at(10, step as u32),
                )
                .unwrap();

            let position = ledger.position(id).unwrap();
            let exited: u32 = ledger.executions_for(id).map(|e| e.quantity).sum();
            assert_eq!(position.remaining_quantity + exited, position.quantity);

            if seen_closed {
                assert_eq!(position.status, PositionStatus::Closed);
            }
            seen_closed |= position.status == PositionStatus::Closed;
        }
        assert!(seen_closed);
    }

    #[test]
    fn test_position_fee_basis_allocates_planned_fee() {
        let mut ledger = Ledger::new();
        let fees = FeeModel::default();
        let plan = TradePlan::long(
            InstrumentClass::UsOption,
            "AMD",
            dec!(2.00),
            dec!(1.50),
            dec!(3.00),
            3,
        );
        let id = ledger.open_position(&plan, &fees, at(9, 40)).unwrap().id;
        // planned: 2 × max(2, 2.4) = 4.80

        let first = ledger
            .apply_execution(id, ExitOrder::new(dec!(2.50), 1), &fees, FeeBasis::Position, at(10, 0))
            .unwrap()
            .clone();
        assert_eq!(first.fees, dec!(1.60));

        let second = ledger
            .apply_execution(id, ExitOrder::new(dec!(2.50), 1), &fees, FeeBasis::Position, at(10, 1))
            .unwrap()
            .clone();
        assert_eq!(second.fees, dec!(1.60));

        let last = ledger
            .apply_execution(id, ExitOrder::new(dec!(2.50), 1), &fees, FeeBasis::Position, at(10, 2))
            .unwrap()
            .clone();
        assert_eq!(last.fees, dec!(1.60));

        let position = ledger.position(id).unwrap();
        assert_eq!(position.fees_charged, position.fees);
        // 3 × (0.50 × 100) - 4.80
        assert_eq!(position.realized_pnl, dec!(145.20));
    }

    #[test]
    fn test_position_fee_basis_remainder_on_last_slice() {
        let mut ledger = Ledger::new();
        let fees = FeeModel::default();
        let plan = TradePlan::long(
            InstrumentClass::UsStock,
            "AAPL",
            dec!(100),
            dec!(95),
            dec!(110),
            3,
        );
        let id = ledger.open_position(&plan, &fees, at(9, 40)).unwrap().id;
        // planned 4.00 split in thirds: 1.33, 1.33, 1.34

        ledger
            .apply_execution(id, ExitOrder::new(dec!(101), 1), &fees, FeeBasis::Position, at(10, 0))
            .unwrap();
        ledger
            .apply_execution(id, ExitOrder::new(dec!(101), 1), &fees, FeeBasis::Position, at(10, 1))
            .unwrap();
        let last = ledger
            .apply_execution(id, ExitOrder::new(dec!(101), 1), &fees, FeeBasis::Position, at(10, 2))
            .unwrap();
        assert_eq!(last.fees, dec!(1.34));
        assert_eq!(ledger.position(id).unwrap().fees_charged, dec!(4.00));
    }
}
