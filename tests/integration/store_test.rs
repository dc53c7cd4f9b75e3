//! Integration tests for journal persistence

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use std::fs;
use tempfile::TempDir;
use trade_journal::config::Config;
use std::path::Path;
use trade_journal::data::{
    open_store, CsvStore, LedgerStore, StoreError, EXECUTION_COLUMNS, POSITIONS_FILE,
    POSITION_COLUMNS,
};
use trade_journal::economics::TradePlan;
use trade_journal::instrument::InstrumentClass;
use trade_journal::ledger::{ExitOrder, ExitReason, Ledger, PositionStatus};
use trade_journal::session::{FixedClock, Session, SessionError};

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// A day with a closed option, a half-closed HK CBBC and an open short
fn busy_session() -> Session {
    let config = Config::default();
    let mut session = Session::new(Ledger::new(), &config).with_clock(FixedClock(at(16, 9, 45)));

    let option = session
        .open_position(
            &TradePlan::long(
                InstrumentClass::UsOption,
                "NVDA",
                dec!(1.00),
                dec!(0.80),
                dec!(1.50),
                4,
            )
            .with_rationale("Reclaimed VWAP, volume confirming"),
        )
        .unwrap()
        .id;
    session
        .apply_execution(option, ExitOrder::new(dec!(1.30), 2))
        .unwrap();
    session
        .apply_execution(
            option,
            ExitOrder::new(dec!(1.50), 2).with_reason(ExitReason::TargetTriggered),
        )
        .unwrap();

    let cbbc = session
        .open_position(
            &TradePlan::long(
                InstrumentClass::HkCbbc,
                "68123",
                dec!(0.250),
                dec!(0.200),
                dec!(0.350),
                20000,
            )
            .with_second_target(dec!(0.400)),
        )
        .unwrap()
        .id;
    session
        .apply_execution(cbbc, ExitOrder::new(dec!(0.283), 5000))
        .unwrap();

    session
        .open_position(
            &TradePlan::long(
                InstrumentClass::UsStock,
                "TSLA",
                dec!(250),
                dec!(260),
                dec!(220),
                30,
            )
            .short(),
        )
        .unwrap();

    session
}

#[test]
fn test_export_import_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(dir.path().join("journal"));
    let session = busy_session();
    session.export_to(&store).unwrap();

    let reloaded = Session::load(&store, &Config::default()).unwrap();
    assert_eq!(reloaded.ledger(), session.ledger());

    let statuses: Vec<_> = reloaded
        .ledger()
        .positions()
        .iter()
        .map(|p| p.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            PositionStatus::Closed,
            PositionStatus::HalfClosed,
            PositionStatus::Open
        ]
    );
}

#[test]
fn test_failed_import_keeps_current_ledger() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(dir.path());
    busy_session().export_to(&store).unwrap();

    // an execution for a position that is not in the file
    let positions = fs::read_to_string(store.positions_path()).unwrap();
    let mut lines: Vec<&str> = positions.lines().collect();
    lines.remove(1);
    fs::write(store.positions_path(), lines.join("\n") + "\n").unwrap();

    let mut session = busy_session();
    let before = session.ledger().clone();
    let result = session.import_from(&store);

    assert!(matches!(result, Err(SessionError::Store(StoreError::Ledger(_)))));
    assert_eq!(session.ledger(), &before);
}

/// Rewrite a journal file, editing its rows by column name
fn edit_rows(path: &Path, columns: &[&str], edit: impl FnOnce(&mut Vec<Vec<String>>)) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let mut rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    edit(&mut rows);

    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(columns).unwrap();
    for row in &rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
}

fn column(columns: &[&str], name: &str) -> usize {
    columns.iter().position(|c| *c == name).unwrap()
}

#[test]
fn test_oversized_quantities_rejected_on_import() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(dir.path());
    busy_session().export_to(&store).unwrap();

    let max = u32::MAX.to_string();
    edit_rows(&store.positions_path(), &POSITION_COLUMNS, |rows| {
        rows[0][column(&POSITION_COLUMNS, "qty_display")] = max.clone();
    });
    edit_rows(&store.executions_path(), &EXECUTION_COLUMNS, |rows| {
        // both NVDA exits: u32::MAX + 2
        rows[0][column(&EXECUTION_COLUMNS, "quantity")] = max.clone();
    });

    let mut session = busy_session();
    let before = session.ledger().clone();
    let result = session.import_from(&store);

    assert!(matches!(result, Err(SessionError::Store(StoreError::Ledger(_)))));
    assert_eq!(session.ledger(), &before);
}

#[test]
fn test_out_of_range_quantity_is_malformed() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(dir.path());
    busy_session().export_to(&store).unwrap();

    edit_rows(&store.executions_path(), &EXECUTION_COLUMNS, |rows| {
        rows[0][column(&EXECUTION_COLUMNS, "quantity")] = "4294967296".to_string();
    });

    assert!(store.load().is_err());
}

#[test]
fn test_import_replaces_ledger() {
    let dir = TempDir::new().unwrap();
    let store = CsvStore::new(dir.path());
    busy_session().export_to(&store).unwrap();

    let mut session =
        Session::new(Ledger::new(), &Config::default()).with_clock(FixedClock(at(17, 9, 30)));
    session.import_from(&store).unwrap();
    assert_eq!(session.ledger().len(), 3);

    // yesterday's CBBC is still held
    let report = session.evaluate_guard(session.today());
    assert_eq!(report.overnight_violations.len(), 1);
    assert_eq!(report.overnight_violations[0].symbol, "68123");
}

#[test]
fn test_legacy_journal_migration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("journal_backup.csv");
    fs::write(
        &path,
        "\
ID,Date,Market,Symbol,Entry,Qty_Display,Actual_Shares,Stop_Price,Target_Price,Invested,Fees,Exit_Price,Net_P_L,Status
093015,2026-10-15,美股期权 (US Option),NVDA,1.0,1,100,0.8,1.5,100.0,4.0,0.7,-34.0,Closed
101200,2026-10-15,美股正股 (US Stock),AAPL,200.0,10,10,190.0,230.0,2000.0,4.0,0.0,0.0,Open
",
    )
    .unwrap();

    let legacy = open_store(&path).unwrap();
    let mut session =
        Session::new(Ledger::new(), &Config::default()).with_clock(FixedClock(at(15, 16, 0)));
    session.import_from(&*legacy).unwrap();

    let ledger = session.ledger();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.executions().len(), 1);
    assert_eq!(ledger.realized_pnl(), dec!(-34));
    assert_eq!(ledger.positions()[1].status, PositionStatus::Open);

    // the migrated journal is written in the current layout
    let store = CsvStore::new(dir.path().join("journal"));
    session.export_to(&store).unwrap();
    assert!(dir.path().join("journal").join(POSITIONS_FILE).exists());
    assert_eq!(store.load().unwrap(), *session.ledger());

    let report = session.evaluate_guard(session.today());
    assert_eq!(report.realized_pl_today, dec!(-34));
    assert_eq!(report.losing_executions_today, 1);
}
