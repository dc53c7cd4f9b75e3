//! Plan and open commands

use super::Context;
use crate::economics::{default_target, suggest_stop, Direction, TradePlan};
use crate::instrument::InstrumentClass;
use crate::ledger::Position;
use crate::session::PlanProposal;
use anyhow::Context as _;
use clap::Args;
use rust_decimal::Decimal;

/// Trade parameters shared by `plan` and `open`
#[derive(Args, Debug)]
pub struct TradeArgs {
    /// Ticker or contract code
    pub symbol: String,

    /// Instrument class: us-option, hk-cbbc, us-stock or hk-stock
    #[arg(short, long)]
    pub market: InstrumentClass,

    /// Entry price
    #[arg(long)]
    pub entry: Decimal,

    /// Stop price (default: `sizing.default_stop_pct` away from entry)
    #[arg(long)]
    pub stop: Option<Decimal>,

    /// Primary target (default: 1.5x entry)
    #[arg(long)]
    pub target: Option<Decimal>,

    /// Second target
    #[arg(long)]
    pub target2: Option<Decimal>,

    /// Display quantity (default: the risk-based size)
    #[arg(short, long)]
    pub qty: Option<u32>,

    /// Sell short instead of buying
    #[arg(long)]
    pub short: bool,

    /// Why this trade, in a sentence
    #[arg(short, long)]
    pub rationale: Option<String>,
}

impl TradeArgs {
    /// Build the plan, filling in stop, target and size defaults
    pub fn to_plan(&self, ctx: &Context) -> anyhow::Result<TradePlan> {
        let direction = if self.short {
            Direction::Short
        } else {
            Direction::Long
        };
        let stop = self.stop.unwrap_or_else(|| {
            suggest_stop(direction, self.entry, ctx.config.sizing.default_stop_pct)
        });
        let target = self
            .target
            .unwrap_or_else(|| default_target(direction, self.entry));

        let quantity = match self.qty {
            Some(qty) => qty,
            None => ctx
                .session
                .suggest_quantity(self.market, self.entry, stop)
                .and_then(|s| s.quantity())
                .context("no --qty given and no risk-based size available")?,
        };

        let mut plan = TradePlan::long(self.market, &self.symbol, self.entry, stop, target, quantity);
        if self.short {
            plan = plan.short();
        }
        if let Some(target2) = self.target2 {
            plan = plan.with_second_target(target2);
        }
        if let Some(rationale) = &self.rationale {
            plan = plan.with_rationale(rationale.as_str());
        }
        Ok(plan)
    }
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub trade: TradeArgs,
}

impl PlanArgs {
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let plan = self.trade.to_plan(ctx)?;
        let proposal = ctx.session.propose(&plan)?;

        if ctx.json {
            return ctx.print_json(&proposal);
        }
        print_proposal(&proposal);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    #[command(flatten)]
    pub trade: TradeArgs,
}

impl OpenArgs {
    pub fn execute(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let plan = self.trade.to_plan(ctx)?;
        let proposal = ctx.session.propose(&plan)?;
        if !ctx.json {
            for warning in &proposal.warnings {
                println!("Warning: {}", warning);
            }
        }
        if let Some(e) = proposal.blocking_error() {
            anyhow::bail!("not opened: {e}");
        }

        let position = ctx.session.open_position(&plan)?;
        ctx.save()?;

        if ctx.json {
            return ctx.print_json(&position);
        }
        print_opened(&position);
        Ok(())
    }
}

fn print_proposal(proposal: &PlanProposal) {
    let plan = &proposal.plan;
    let economics = &proposal.economics;

    println!(
        "{} {} {} x{} @ {}",
        plan.symbol, plan.class, plan.direction, plan.quantity, plan.entry_price
    );
    println!("  Actual units:   {}", economics.actual_units);
    println!("  Principal:      {:.2}", economics.principal);
    println!("  Fees (est.):    {:.2}", economics.fees);
    println!(
        "  Loss at stop:   -{:.2} ({})",
        economics.projected_loss, plan.stop_price
    );
    println!(
        "  Profit target:  {:.2} ({})",
        economics.projected_profit, plan.target_price
    );
    match economics.risk_reward {
        Some(rr) => println!("  Risk/reward:    {:.2}", rr),
        None => println!("  Risk/reward:    n/a"),
    }
    if let Some(second) = &economics.second_target {
        println!(
            "  Second target:  {:.2} ({}), R:R {}",
            second.projected_profit,
            second.target_price,
            second
                .risk_reward
                .map(|rr| format!("{:.2}", rr))
                .unwrap_or_else(|| "n/a".to_string())
        );
    }
    if let Some(sizing) = &proposal.sizing {
        match sizing.quantity() {
            Ok(qty) => println!("  Suggested size: {}", qty),
            Err(e) => println!("  Suggested size: none ({})", e),
        }
    }
    for warning in &proposal.warnings {
        println!("Warning: {}", warning);
    }
    match proposal.blocking_error() {
        Some(e) => println!("BLOCKED: {}", e),
        None => println!("OK to open"),
    }
}

fn print_opened(position: &Position) {
    println!(
        "Opened {} {} {} x{} @ {} [{}]",
        position.symbol,
        position.class,
        position.direction,
        position.quantity,
        position.entry_price,
        position.id
    );
    println!(
        "  Stop {}  Target {}  Principal {:.2}  Fees {:.2}",
        position.stop_price, position.target_price, position.principal, position.fees
    );
    if position.class.forbids_overnight() {
        println!("  {} must be flat by the close", position.class);
    }
}
