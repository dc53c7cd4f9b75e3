//! Exit command implementation

use super::{resolve_position, Context};
use crate::ledger::{ExitOrder, ExitReason};
use anyhow::Context as _;
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct ExitArgs {
    /// Position id, or a unique prefix of it
    pub id: String,

    /// Fill price
    #[arg(long)]
    pub price: Decimal,

    /// Display units to exit (default: everything remaining)
    #[arg(short, long)]
    pub qty: Option<u32>,

    /// manual, stop or target (default: inferred from the price)
    #[arg(long)]
    pub reason: Option<ExitReason>,
}

impl ExitArgs {
    pub fn execute(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let id = resolve_position(ctx.session.ledger(), &self.id)?;
        let remaining = ctx
            .session
            .ledger()
            .position(id)
            .map(|p| p.remaining_quantity)
            .with_context(|| format!("unknown position {id}"))?;

        let mut order = ExitOrder::new(self.price, self.qty.unwrap_or(remaining));
        if let Some(reason) = self.reason {
            order = order.with_reason(reason);
        }

        let execution = ctx.session.apply_execution(id, order)?;
        ctx.save()?;
        let report = ctx.session.evaluate_guard(execution.date);

        if ctx.json {
            return ctx.print_json(&execution);
        }

        let status = ctx
            .session
            .ledger()
            .position(id)
            .map(|p| p.status.label())
            .unwrap_or("?");
        println!(
            "Exited {} @ {} ({}): net {:.2}, fees {:.2}. Position {}",
            execution.quantity,
            execution.exit_price,
            execution.reason,
            execution.net_pnl,
            execution.fees,
            status
        );
        println!("Realized today: {:.2}", report.realized_pl_today);
        if report.is_locked {
            println!(
                "LOCKED: daily loss limit of {} reached. Stop trading for the day.",
                report.daily_loss_limit
            );
        } else if report.cooldown_advised {
            println!(
                "{} losses in a row. Step away before the next trade.",
                report.consecutive_losses
            );
        }
        Ok(())
    }
}
