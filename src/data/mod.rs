//! Journal persistence
//!
//! The ledger is stored as two CSV files; older single-file journals are
//! migrated on import.

mod legacy;
mod records;
mod store;

pub use legacy::{is_legacy_header, LegacyJournal};
pub use records::{ExecutionRecord, PositionRecord, EXECUTION_COLUMNS, POSITION_COLUMNS};
pub use store::{CsvStore, LedgerStore, EXECUTIONS_FILE, POSITIONS_FILE};

use crate::ledger::LedgerError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// A row that does not parse
    #[error("{}, record {record}: {message}", file.display())]
    Malformed {
        file: PathBuf,
        record: usize,
        message: String,
    },
    /// Rows parse but contradict each other
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{} cannot be written", .0.display())]
    ReadOnly(PathBuf),
    #[error("{} is not a journal file", .0.display())]
    UnrecognisedFormat(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        StoreError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Pick the store for an import path
///
/// A directory (existing or not) is a two-file journal. A file is either a
/// single-file journal, recognised by its header, or a `positions.csv`
/// whose directory holds the journal.
pub fn open_store(path: &Path) -> Result<Box<dyn LedgerStore>, StoreError> {
    if !path.is_file() {
        return Ok(Box::new(CsvStore::new(path)));
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| StoreError::csv(path, e))?;
    let headers = reader.headers().map_err(|e| StoreError::csv(path, e))?;
    if is_legacy_header(headers) {
        return Ok(Box::new(LegacyJournal::new(path)));
    }

    let is_positions = path.file_name().and_then(|n| n.to_str()) == Some(POSITIONS_FILE);
    match path.parent() {
        Some(dir) if is_positions => Ok(Box::new(CsvStore::new(dir))),
        _ => Err(StoreError::UnrecognisedFormat(path.to_path_buf())),
    }
}
