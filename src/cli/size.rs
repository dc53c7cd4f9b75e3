//! Size command implementation

use super::Context;
use crate::economics::{suggest_stop, Direction};
use crate::instrument::InstrumentClass;
use crate::risk::{RiskPctSizer, SizingSuggestion};
use anyhow::bail;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct SizeArgs {
    /// Instrument class: us-option, hk-cbbc, us-stock or hk-stock
    #[arg(short, long)]
    pub market: InstrumentClass,

    /// Entry price
    #[arg(long)]
    pub entry: Decimal,

    /// Stop price (default: `sizing.default_stop_pct` below entry)
    #[arg(long)]
    pub stop: Option<Decimal>,

    /// Account capital (default: `sizing.capital`)
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Percent of capital to risk (default: `sizing.risk_pct`)
    #[arg(long)]
    pub risk_pct: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct SizeReport {
    capital: Decimal,
    risk_pct: Decimal,
    entry: Decimal,
    stop: Decimal,
    suggestion: SizingSuggestion,
}

impl SizeArgs {
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let sizing = &ctx.config.sizing;
        let Some(capital) = self.capital.or(sizing.capital) else {
            bail!("no capital given: pass --capital or set sizing.capital");
        };
        let risk_pct = self.risk_pct.unwrap_or(sizing.risk_pct);
        let stop = self.stop.unwrap_or_else(|| {
            suggest_stop(Direction::Long, self.entry, sizing.default_stop_pct)
        });

        let suggestion = RiskPctSizer::new(capital, risk_pct).suggest(
            self.entry,
            stop,
            self.market.multiplier(),
        )?;

        let report = SizeReport {
            capital,
            risk_pct,
            entry: self.entry,
            stop,
            suggestion,
        };
        if ctx.json {
            return ctx.print_json(&report);
        }

        println!(
            "{} entry {} stop {}, risking {}% of {}",
            self.market, report.entry, report.stop, report.risk_pct, report.capital
        );
        match &report.suggestion {
            SizingSuggestion::Fits {
                quantity,
                allowed_loss,
                per_unit_risk,
            } => {
                println!("  Allowed loss:   {:.2}", allowed_loss);
                println!("  Risk per unit:  {:.2}", per_unit_risk);
                println!("  Suggested size: {}", quantity);
            }
            SizingSuggestion::Infeasible {
                allowed_loss,
                per_unit_risk,
            } => {
                println!(
                    "  One unit risks {:.2}, more than the {:.2} allowed; skip this trade or tighten the stop",
                    per_unit_risk, allowed_loss
                );
            }
        }
        Ok(())
    }
}
