//! Risk management module
//!
//! Position sizing and discipline guardrails

mod guard;
mod sizing;
mod types;

pub use guard::{
    consecutive_losses, per_trade_cap_check, DisciplineGuard, GuardReport, OvernightViolation,
};
pub use sizing::{suggest_quantity, RiskPctSizer, SizingSuggestion};
pub use types::{RiskError, Violation};
