//! Ledger errors

use super::PositionId;
use crate::economics::ValidationError;
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Plan or exit parameters failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Exit quantity outside 1..=remaining
    #[error("Invalid exit quantity {requested}: {remaining} remaining")]
    InvalidQuantity { requested: u32, remaining: u32 },
    /// No position with this identifier
    #[error("Unknown position: {0}")]
    UnknownPosition(PositionId),
    /// Imported records break a ledger invariant
    #[error("Inconsistent record for {id}: {reason}")]
    Inconsistent { id: String, reason: String },
}
