//! Guard and list commands

use super::Context;
use crate::ledger::{Execution, Position};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct GuardArgs {
    /// Trading day (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl GuardArgs {
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let date = self.date.unwrap_or_else(|| ctx.session.today());
        let report = ctx.session.evaluate_guard(date);

        if ctx.json {
            return ctx.print_json(&report);
        }

        println!("Discipline report for {}", report.date);
        println!(
            "  Realized P&L:      {:.2} (limit -{})",
            report.realized_pl_today, report.daily_loss_limit
        );
        println!("  Losing exits:      {}", report.losing_executions_today);
        println!("  Losing streak:     {}", report.consecutive_losses);
        println!("  Positions opened:  {}", report.positions_opened_today);
        if report.is_locked {
            println!("  LOCKED: no new positions today");
        } else {
            println!("  Trading allowed");
        }
        if report.cooldown_advised {
            println!("  Cooldown advised: take a break before the next trade");
        }
        for v in &report.overnight_violations {
            println!(
                "  Overnight: {} {} opened {} still holds {} [{}]",
                v.class, v.symbol, v.opened_on, v.remaining_quantity, v.position_id
            );
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only open and half-closed positions
    #[arg(long)]
    pub active: bool,

    /// Only positions opened on this day
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Include each position's executions
    #[arg(short, long)]
    pub executions: bool,
}

#[derive(Debug, Serialize)]
struct ListedPosition<'a> {
    #[serde(flatten)]
    position: &'a Position,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    executions: Vec<&'a Execution>,
}

impl ListArgs {
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let ledger = ctx.session.ledger();
        let listed: Vec<ListedPosition> = ledger
            .positions()
            .iter()
            .filter(|p| !self.active || p.status.is_active())
            .filter(|p| self.date.map_or(true, |d| p.opened_on == d))
            .map(|position| ListedPosition {
                position,
                executions: if self.executions {
                    ledger.executions_for(position.id).collect()
                } else {
                    Vec::new()
                },
            })
            .collect();

        if ctx.json {
            return ctx.print_json(&listed);
        }

        if listed.is_empty() {
            println!("No positions");
            return Ok(());
        }
        println!(
            "{:<10} {:<10} {:<9} {:<8} {:<5} {:>10} {:>7} {:>10} {:>10} {:<11}",
            "ID", "Date", "Market", "Symbol", "Side", "Entry", "Qty", "Exit", "Net P&L", "Status"
        );
        for item in &listed {
            let p = item.position;
            let id = p.id.to_string();
            println!(
                "{:<10} {:<10} {:<9} {:<8} {:<5} {:>10} {:>7} {:>10} {:>10.2} {:<11}",
                &id[..8],
                p.opened_on,
                p.class.label(),
                p.symbol,
                p.direction.to_string(),
                p.entry_price,
                format!("{}/{}", p.remaining_quantity, p.quantity),
                p.average_exit_price,
                p.realized_pnl,
                p.status.label()
            );
            for e in &item.executions {
                println!(
                    "    {} {} x{} @ {} net {:.2} fees {:.2}",
                    e.executed_at.format("%Y-%m-%d %H:%M"),
                    e.reason,
                    e.quantity,
                    e.exit_price,
                    e.net_pnl,
                    e.fees
                );
            }
        }
        Ok(())
    }
}
