//! Trade economics
//!
//! Trade plans, their validation, and the money amounts derived from them

mod calculator;
mod types;

pub use calculator::{
    default_target, exit_slice, net_pnl, plan_economics, plan_warnings, suggest_stop,
};
pub use types::{
    Direction, ExitSlice, PlanEconomics, PlanWarning, TargetEconomics, TradePlan, ValidationError,
    MAX_AMOUNT, MAX_PRICE,
};
