//! CSV journal store

use super::records::{ExecutionRecord, PositionRecord, EXECUTION_COLUMNS, POSITION_COLUMNS};
use super::StoreError;
use crate::ledger::{Execution, Ledger, Position};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const POSITIONS_FILE: &str = "positions.csv";
pub const EXECUTIONS_FILE: &str = "executions.csv";

/// Persistent home of a ledger
pub trait LedgerStore {
    /// Read and validate the whole ledger
    fn load(&self) -> Result<Ledger, StoreError>;

    /// Replace the stored ledger
    fn save(&self, ledger: &Ledger) -> Result<(), StoreError>;
}

/// Journal kept as `positions.csv` and `executions.csv` in one directory
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn positions_path(&self) -> PathBuf {
        self.dir.join(POSITIONS_FILE)
    }

    pub fn executions_path(&self) -> PathBuf {
        self.dir.join(EXECUTIONS_FILE)
    }
}

impl LedgerStore for CsvStore {
    /// A directory without journal files loads as an empty ledger
    fn load(&self) -> Result<Ledger, StoreError> {
        let positions: Vec<PositionRecord> = read_records(&self.positions_path())?;
        let executions: Vec<ExecutionRecord> = read_records(&self.executions_path())?;

        let ledger = Ledger::from_records(
            positions.into_iter().map(Position::from).collect(),
            executions.into_iter().map(Execution::from).collect(),
        )?;

        tracing::debug!(
            dir = %self.dir.display(),
            positions = ledger.len(),
            executions = ledger.executions().len(),
            "Journal loaded"
        );
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let positions_tmp = write_temp(
            &self.positions_path(),
            &POSITION_COLUMNS,
            ledger.positions().iter().map(PositionRecord::from),
        )?;
        let executions_tmp = write_temp(
            &self.executions_path(),
            &EXECUTION_COLUMNS,
            ledger.executions().iter().map(ExecutionRecord::from),
        )?;

        replace(&positions_tmp, &self.positions_path())?;
        replace(&executions_tmp, &self.executions_path())?;

        tracing::debug!(
            dir = %self.dir.display(),
            positions = ledger.len(),
            executions = ledger.executions().len(),
            "Journal saved"
        );
        Ok(())
    }
}

/// Read every row of a CSV file, failing on the first malformed one
pub(crate) fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| StoreError::csv(path, e))?;
    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| StoreError::Malformed {
                file: path.to_path_buf(),
                record: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Write rows next to `path` under a temporary name
fn write_temp<T: Serialize>(
    path: &Path,
    columns: &[&str],
    rows: impl Iterator<Item = T>,
) -> Result<PathBuf, StoreError> {
    let tmp = path.with_extension("csv.tmp");
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&tmp)
        .map_err(|e| StoreError::csv(&tmp, e))?;

    writer
        .write_record(columns)
        .map_err(|e| StoreError::csv(&tmp, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| StoreError::csv(&tmp, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
    Ok(tmp)
}

fn replace(tmp: &Path, path: &Path) -> Result<(), StoreError> {
    fs::rename(tmp, path).map_err(|e| StoreError::io(path, e))
}
